use std::fmt;
use std::str::FromStr;

use board_types::Value;

use crate::principal::{Principal, PrincipalError};
use crate::text::{MessageText, TextError};

pub const SET_MESSAGE: &str = "set-message";
pub const CLEAR_MESSAGE: &str = "clear-message";
pub const GET_MESSAGE: &str = "get-message";
pub const GET_MY_MESSAGE: &str = "get-my-message";

const MAX_CONTRACT_NAME_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("no {kind} function named '{name}'")]
    UnknownFunction { kind: &'static str, name: String },
    #[error("{function} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{function} argument {index}: expected {expected}, got {got}")]
    ArgumentType {
        function: &'static str,
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
    #[error(transparent)]
    Text(#[from] TextError),
    #[error(transparent)]
    Principal(#[from] PrincipalError),
    #[error("invalid contract identifier '{0}'")]
    ContractId(String),
}

/// `<address>.<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractId {
    pub address: Principal,
    pub name: String,
}

impl ContractId {
    pub fn new(address: Principal, name: &str) -> Result<Self, CallError> {
        let valid_name = !name.is_empty()
            && name.len() <= MAX_CONTRACT_NAME_LEN
            && name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_name {
            return Err(CallError::ContractId(format!("{}.{}", address, name)));
        }
        Ok(Self {
            address,
            name: name.to_string(),
        })
    }
}

impl FromStr for ContractId {
    type Err = CallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, name) = s
            .split_once('.')
            .ok_or_else(|| CallError::ContractId(s.to_string()))?;
        let address = Principal::parse(address)?;
        Self::new(address, name)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

/// State-mutating calls. The sender is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicCall {
    SetMessage(MessageText),
    ClearMessage,
}

impl PublicCall {
    pub fn parse(function: &str, args: &[Value]) -> Result<Self, CallError> {
        match function {
            SET_MESSAGE => {
                expect_arity(SET_MESSAGE, args, 1)?;
                let text = expect_string(SET_MESSAGE, args, 0)?;
                Ok(Self::SetMessage(MessageText::new(text)?))
            }
            CLEAR_MESSAGE => {
                expect_arity(CLEAR_MESSAGE, args, 0)?;
                Ok(Self::ClearMessage)
            }
            _ => Err(CallError::UnknownFunction {
                kind: "public",
                name: function.to_string(),
            }),
        }
    }

    pub fn function(&self) -> &'static str {
        match self {
            Self::SetMessage(_) => SET_MESSAGE,
            Self::ClearMessage => CLEAR_MESSAGE,
        }
    }

    pub fn arguments(&self) -> Vec<Value> {
        match self {
            Self::SetMessage(text) => vec![Value::string(text.as_str())],
            Self::ClearMessage => vec![],
        }
    }
}

/// Queries that never mutate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOnlyCall {
    GetMessage(Principal),
    GetMyMessage,
}

impl ReadOnlyCall {
    pub fn parse(function: &str, args: &[Value]) -> Result<Self, CallError> {
        match function {
            GET_MESSAGE => {
                expect_arity(GET_MESSAGE, args, 1)?;
                match &args[0] {
                    Value::Principal(p) => Ok(Self::GetMessage(Principal::parse(p)?)),
                    other => Err(CallError::ArgumentType {
                        function: GET_MESSAGE,
                        index: 0,
                        expected: "principal",
                        got: other.type_name(),
                    }),
                }
            }
            GET_MY_MESSAGE => {
                expect_arity(GET_MY_MESSAGE, args, 0)?;
                Ok(Self::GetMyMessage)
            }
            _ => Err(CallError::UnknownFunction {
                kind: "read-only",
                name: function.to_string(),
            }),
        }
    }

    pub fn function(&self) -> &'static str {
        match self {
            Self::GetMessage(_) => GET_MESSAGE,
            Self::GetMyMessage => GET_MY_MESSAGE,
        }
    }
}

fn expect_arity(function: &'static str, args: &[Value], expected: usize) -> Result<(), CallError> {
    if args.len() != expected {
        return Err(CallError::ArgumentCount {
            function,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn expect_string<'a>(
    function: &'static str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, CallError> {
    args[index].as_str().ok_or(CallError::ArgumentType {
        function,
        index,
        expected: "string-utf8",
        got: args[index].type_name(),
    })
}
