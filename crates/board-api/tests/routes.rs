use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value as Json, json};
use tower::ServiceExt;

use board_api::{AppState, AppStateInner, router};
use board_contract::{ContractId, MessageBoard};

const CONTRACT: &str = "ST3D86ZD0YNZ690B7YJ8F9M01G0PK3B46G7S9XH3F.message-board-v2";
const WALLET1: &str = "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5";
const WALLET2: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

fn app() -> (Router, AppState) {
    let state = AppStateInner::start(
        Arc::new(MessageBoard::in_memory()),
        "test-secret".into(),
        CONTRACT.parse::<ContractId>().unwrap(),
        "MessageBoard DApp".into(),
    );
    (router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Json::Null)
    };
    (status, body)
}

fn post(uri: &str, token: Option<&str>, body: Json) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn connect(app: &Router, principal: &str) -> String {
    let (status, body) = send(app, post("/auth/connect", None, json!({ "principal": principal }))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn call(app: &Router, token: &str, function: &str, arguments: Json) -> (StatusCode, Json) {
    let uri = format!("/contracts/{}/call/{}", CONTRACT, function);
    send(app, post(&uri, Some(token), json!({ "arguments": arguments }))).await
}

async fn read(app: &Router, sender: &str, function: &str, arguments: Json) -> Json {
    let uri = format!("/contracts/{}/call-read/{}", CONTRACT, function);
    let (status, body) = send(app, post(&uri, None, json!({ "sender": sender, "arguments": arguments }))).await;
    assert_eq!(status, StatusCode::OK, "read {} failed: {}", function, body);
    body
}

/// Poll until the transaction leaves `pending`.
async fn confirmed(app: &Router, tx_id: &str) -> Json {
    for _ in 0..200 {
        let req = Request::get(format!("/tx/{}", tx_id)).body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "pending" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("transaction {} never confirmed", tx_id);
}

async fn submit_and_confirm(app: &Router, token: &str, function: &str, arguments: Json) -> Json {
    let (status, body) = call(app, token, function, arguments).await;
    assert_eq!(status, StatusCode::ACCEPTED, "call {} failed: {}", function, body);
    confirmed(app, body["tx_id"].as_str().unwrap()).await
}

fn utf8(text: &str) -> Json {
    json!({ "type": "string-utf8", "value": text })
}

fn principal(p: &str) -> Json {
    json!({ "type": "principal", "value": p })
}

#[tokio::test]
async fn two_wallet_scenario() {
    let (app, _) = app();
    let t1 = connect(&app, WALLET1).await;
    let t2 = connect(&app, WALLET2).await;

    let tx = submit_and_confirm(&app, &t1, "set-message", json!([utf8("hello stacks")])).await;
    assert_eq!(tx["status"], "success");
    assert_eq!(tx["result"], "(ok true)");

    let mine = read(&app, WALLET1, "get-my-message", json!([])).await;
    assert_eq!(mine["value"], utf8("hello stacks"));
    assert_eq!(mine["result"], "u\"hello stacks\"");
    assert_eq!(mine["present"], true);

    submit_and_confirm(&app, &t2, "set-message", json!([utf8("merhaba")])).await;
    let theirs = read(&app, WALLET1, "get-message", json!([principal(WALLET2)])).await;
    assert_eq!(theirs["value"]["value"], "merhaba");

    let cleared = submit_and_confirm(&app, &t2, "clear-message", json!([])).await;
    assert_eq!(cleared["result"], "(ok true)");

    let after = read(&app, WALLET1, "get-message", json!([principal(WALLET2)])).await;
    assert_eq!(after["value"]["value"], "none");
    assert_eq!(after["present"], false);
}

#[tokio::test]
async fn empty_message_aborts_with_u101() {
    let (app, _) = app();
    let token = connect(&app, WALLET1).await;

    submit_and_confirm(&app, &token, "set-message", json!([utf8("keep")])).await;
    let tx = submit_and_confirm(&app, &token, "set-message", json!([utf8("")])).await;
    assert_eq!(tx["status"], "abort_by_response");
    assert_eq!(tx["result"], "(err u101)");

    let mine = read(&app, WALLET1, "get-my-message", json!([])).await;
    assert_eq!(mine["value"]["value"], "keep");
}

#[tokio::test]
async fn length_bound_enforced_before_submission() {
    let (app, _) = app();
    let token = connect(&app, WALLET1).await;

    let tx = submit_and_confirm(&app, &token, "set-message", json!([utf8(&"x".repeat(280))])).await;
    assert_eq!(tx["status"], "success");

    let (status, _) = call(&app, &token, "set-message", json!([utf8(&"x".repeat(281))])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mine = read(&app, WALLET1, "get-my-message", json!([])).await;
    assert_eq!(mine["value"]["value"].as_str().unwrap().chars().count(), 280);
}

#[tokio::test]
async fn clear_is_idempotent_over_http() {
    let (app, _) = app();
    let token = connect(&app, WALLET1).await;

    for _ in 0..2 {
        let tx = submit_and_confirm(&app, &token, "clear-message", json!([])).await;
        assert_eq!(tx["status"], "success");
    }
    let mine = read(&app, WALLET1, "get-my-message", json!([])).await;
    assert_eq!(mine["result"], "u\"none\"");
}

#[tokio::test]
async fn public_calls_require_session() {
    let (app, _) = app();
    let uri = format!("/contracts/{}/call/clear-message", CONTRACT);

    let (status, _) = send(&app, post(&uri, None, json!({ "arguments": [] }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post(&uri, Some("not-a-jwt"), json!({ "arguments": [] }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_bad_calls() {
    let (app, _) = app();
    let token = connect(&app, WALLET1).await;

    // Unknown function, read-only function via public call
    let (status, _) = call(&app, &token, "delete-everything", json!([])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, &token, "get-message", json!([principal(WALLET2)])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Wrong argument type and arity
    let (status, _) = call(&app, &token, "set-message", json!([principal(WALLET2)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, &token, "clear-message", json!([utf8("x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Some other contract
    let uri = "/contracts/ST3D86ZD0YNZ690B7YJ8F9M01G0PK3B46G7S9XH3F.other/call/clear-message";
    let (status, _) = send(&app, post(uri, Some(&token), json!({ "arguments": [] }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bad read-only sender
    let uri = format!("/contracts/{}/call-read/get-my-message", CONTRACT);
    let (status, _) = send(&app, post(&uri, None, json!({ "sender": "nobody" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connect_validates_principal() {
    let (app, _) = app();
    let (status, _) = send(&app, post("/auth/connect", None, json!({ "principal": "0xabc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(&app, post("/auth/connect", None, json!({ "principal": WALLET1.to_lowercase() }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal"], WALLET1);
}

#[tokio::test]
async fn unknown_tx_and_node_info() {
    let (app, state) = app();

    let req = Request::get("/tx/0x00").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = Request::get("/info").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contract_id"], CONTRACT);
    assert_eq!(body["max_message_length"], 280);

    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    assert_eq!(state.dispatcher.connection_count(), 0);
}

#[tokio::test]
async fn confirmations_reach_event_subscribers() {
    let (app, state) = app();
    let mut events = state.dispatcher.subscribe();
    let token = connect(&app, WALLET2).await;

    submit_and_confirm(&app, &token, "set-message", json!([utf8("merhaba")])).await;

    let mut seen = Vec::new();
    while seen.len() < 3 {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for events")
            .unwrap();
        seen.push(serde_json::to_value(&event).unwrap()["type"].as_str().unwrap().to_string());
    }
    assert_eq!(seen, vec!["TxSubmitted", "TxConfirmed", "MessageSet"]);
}
