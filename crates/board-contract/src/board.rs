use std::sync::Arc;

use anyhow::Result;
use board_types::Value;
use tracing::debug;

use crate::abi::{PublicCall, ReadOnlyCall};
use crate::error::{ErrorCode, Response};
use crate::principal::Principal;
use crate::store::{MemoryStore, RecordStore};
use crate::text::MessageText;

/// Returned by reads when a principal has no message.
pub const SENTINEL: &str = "none";

/// Result of a read-only call. `present` distinguishes a stored message from
/// the sentinel fallback, which the text alone cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub text: String,
    pub present: bool,
}

impl ReadOutcome {
    pub fn to_value(&self) -> Value {
        Value::string(self.text.clone())
    }
}

/// The message store contract: one message per principal.
///
/// The outer `Result` on every operation carries storage failures; the
/// inner [`Response`] is the contract's own answer.
pub struct MessageBoard {
    store: Arc<dyn RecordStore>,
}

impl MessageBoard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Set the caller's message. Empty text is rejected with
    /// [`ErrorCode::EmptyMessage`] and leaves the record untouched.
    pub fn set_message(&self, caller: &Principal, text: &MessageText) -> Result<Response> {
        if text.is_empty() {
            debug!("{} set-message rejected: empty", caller);
            return Ok(Err(ErrorCode::EmptyMessage));
        }

        self.store.save(caller, text)?;
        debug!("{} set-message ({} code points)", caller, text.len());
        Ok(Ok(true))
    }

    /// Reset the caller's message. Succeeds whether or not one was set.
    pub fn clear_message(&self, caller: &Principal) -> Result<Response> {
        self.store.remove(caller)?;
        debug!("{} clear-message", caller);
        Ok(Ok(true))
    }

    /// Anyone's message, or [`SENTINEL`].
    pub fn get_message(&self, principal: &Principal) -> Result<String> {
        Ok(self
            .lookup(principal)?
            .map(MessageText::into_string)
            .unwrap_or_else(|| SENTINEL.to_string()))
    }

    pub fn get_my_message(&self, caller: &Principal) -> Result<String> {
        self.get_message(caller)
    }

    /// Presence-aware read.
    pub fn lookup(&self, principal: &Principal) -> Result<Option<MessageText>> {
        self.store.load(principal)
    }

    /// Apply a public call on behalf of `sender`.
    pub fn apply(&self, sender: &Principal, call: &PublicCall) -> Result<Response> {
        match call {
            PublicCall::SetMessage(text) => self.set_message(sender, text),
            PublicCall::ClearMessage => self.clear_message(sender),
        }
    }

    /// Evaluate a read-only call as `sender`.
    pub fn read(&self, sender: &Principal, call: &ReadOnlyCall) -> Result<ReadOutcome> {
        let target = match call {
            ReadOnlyCall::GetMessage(principal) => principal,
            ReadOnlyCall::GetMyMessage => sender,
        };
        let outcome = match self.lookup(target)? {
            Some(text) => ReadOutcome {
                text: text.into_string(),
                present: true,
            },
            None => ReadOutcome {
                text: SENTINEL.to_string(),
                present: false,
            },
        };
        Ok(outcome)
    }
}
