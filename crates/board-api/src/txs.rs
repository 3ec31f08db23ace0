use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::state::AppState;

/// GET /tx/{tx_id}
pub async fn tx_status(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let status = state
        .executor
        .status(&tx_id.to_ascii_lowercase())
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(status))
}
