use board_types::Value;

/// Domain errors returned by the contract. The numeric code is part of the
/// wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorCode {
    #[error("message must not be empty")]
    EmptyMessage,
}

impl ErrorCode {
    pub const fn code(self) -> u64 {
        match self {
            Self::EmptyMessage => 101,
        }
    }

    pub fn to_value(self) -> Value {
        Value::err(Value::UInt(self.code()))
    }
}

/// Contract response of a public call: `(ok true)` or `(err uN)`.
pub type Response = Result<bool, ErrorCode>;

pub fn response_value(response: &Response) -> Value {
    match response {
        Ok(b) => Value::ok(Value::Bool(*b)),
        Err(code) => code.to_value(),
    }
}
