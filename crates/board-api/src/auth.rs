use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};

use board_contract::Principal;
use board_types::api::{Claims, ConnectRequest, ConnectResponse};

use crate::state::AppState;

/// Session lifetime for a connected wallet.
const SESSION_DAYS: i64 = 30;

/// POST /auth/connect: bind a session to the wallet's principal.
/// Key ownership is proven to the wallet, not to this node: any well-formed
/// principal gets a token, so the node must sit behind a trusted wallet.
pub async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let principal = Principal::parse(&req.principal).map_err(|e| {
        warn!("Rejected connect for '{}': {}", req.principal, e);
        StatusCode::BAD_REQUEST
    })?;

    let token = create_token(&state.jwt_secret, &principal).map_err(|e| {
        error!("Failed to sign session token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!("{} connected", principal);

    Ok(Json(ConnectResponse {
        principal: principal.to_string(),
        token,
    }))
}

pub fn create_token(secret: &str, principal: &Principal) -> anyhow::Result<String> {
    let claims = Claims {
        sub: principal.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
