use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("no wallet connected")]
    NotConnected,

    #[error("transaction {0} still pending after timeout")]
    Timeout(String),

    #[error("unexpected result from {function}: {result}")]
    UnexpectedResult { function: String, result: String },
}
