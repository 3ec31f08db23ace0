use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Value;

// -- JWT Claims --

/// Session claims issued on wallet connect. `sub` is the connected principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Session --

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectRequest {
    pub principal: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ConnectResponse {
    pub principal: String,
    pub token: String,
}

// -- Contract calls --

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReadOnlyRequest {
    pub sender: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// `result` is the canonical textual form of `value`. `present` is false
/// when the read fell back to the sentinel.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReadOnlyResponse {
    pub okay: bool,
    pub result: String,
    pub value: Value,
    pub present: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PublicCallRequest {
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// Submission handle. Confirmation is observed later via `/tx/{tx_id}`
/// or the event stream.
#[derive(Debug, Deserialize, Serialize)]
pub struct PublicCallResponse {
    pub tx_id: String,
}

// -- Transactions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Success,
    AbortByResponse,
    /// Not applied: the node failed to persist the call.
    Dropped,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TxStatusResponse {
    pub tx_id: String,
    pub sender: String,
    pub function: String,
    pub status: TxStatus,
    pub result: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
}

// -- Node --

#[derive(Debug, Deserialize, Serialize)]
pub struct ContractInfo {
    pub contract_id: String,
    pub app_name: String,
    pub max_message_length: usize,
}
