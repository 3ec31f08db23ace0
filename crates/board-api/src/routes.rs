use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use board_contract::MAX_MESSAGE_LEN;
use board_gateway::connection;
use board_types::api::ContractInfo;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, calls, txs};

/// Full HTTP surface of the node.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/auth/connect", post(auth::connect))
        .route("/contracts/{contract_id}/call-read/{function}", post(calls::call_read))
        .route("/tx/{tx_id}", get(txs::tx_status))
        .route("/events", get(events))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/contracts/{contract_id}/call/{function}", post(calls::call_public))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(ContractInfo {
        contract_id: state.contract_id.to_string(),
        app_name: state.app_name.clone(),
        max_message_length: MAX_MESSAGE_LEN,
    })
}

async fn events(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    let contract_id = state.contract_id.to_string();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher, contract_id))
}
