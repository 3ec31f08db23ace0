use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};

use board_contract::{CallError, ContractId, Principal, PublicCall, ReadOnlyCall};
use board_types::api::{
    Claims, PublicCallRequest, PublicCallResponse, ReadOnlyRequest, ReadOnlyResponse,
};

use crate::state::AppState;

/// POST /contracts/{contract_id}/call-read/{function}. No session needed:
/// anyone may read anyone's message.
pub async fn call_read(
    State(state): State<AppState>,
    Path((contract_id, function)): Path<(String, String)>,
    Json(req): Json<ReadOnlyRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    check_contract(&state, &contract_id)?;

    let sender = Principal::parse(&req.sender).map_err(|e| {
        warn!("Bad read-only sender '{}': {}", req.sender, e);
        StatusCode::BAD_REQUEST
    })?;
    let call = ReadOnlyCall::parse(&function, &req.arguments).map_err(call_error_status)?;

    // Run blocking store read off the async runtime
    let board = state.board.clone();
    let outcome = tokio::task::spawn_blocking(move || board.read(&sender, &call))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("Read failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    let value = outcome.to_value();
    Ok(Json(ReadOnlyResponse {
        okay: true,
        result: value.to_string(),
        value,
        present: outcome.present,
    }))
}

/// POST /contracts/{contract_id}/call/{function}. The sender is the session's
/// principal. Returns a submission handle; the outcome arrives later.
pub async fn call_public(
    State(state): State<AppState>,
    Path((contract_id, function)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PublicCallRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    check_contract(&state, &contract_id)?;

    let sender = Principal::parse(&claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;
    let call = PublicCall::parse(&function, &req.arguments).map_err(call_error_status)?;

    let tx_id = state
        .executor
        .submit(sender, call)
        .await
        .map_err(|e| { error!("Submit failed: {}", e); StatusCode::SERVICE_UNAVAILABLE })?;

    Ok((StatusCode::ACCEPTED, Json(PublicCallResponse { tx_id })))
}

/// The node serves exactly one contract.
fn check_contract(state: &AppState, contract_id: &str) -> Result<(), StatusCode> {
    match contract_id.parse::<ContractId>() {
        Ok(id) if id == state.contract_id => Ok(()),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

fn call_error_status(e: CallError) -> StatusCode {
    warn!("Rejected call: {}", e);
    match e {
        CallError::UnknownFunction { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    }
}
