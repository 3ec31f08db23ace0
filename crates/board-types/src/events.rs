use serde::{Deserialize, Serialize};

use crate::api::TxStatus;

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    /// Sent once when a client connects
    Ready { contract_id: String },

    /// A public call was accepted into the submission queue
    TxSubmitted {
        tx_id: String,
        sender: String,
        function: String,
    },

    /// A submitted call was applied
    TxConfirmed {
        tx_id: String,
        sender: String,
        function: String,
        status: TxStatus,
        result: String,
    },

    /// A principal's message was set or overwritten
    MessageSet {
        owner: String,
        text: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A principal's message was cleared
    MessageCleared {
        owner: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl BoardEvent {
    /// Returns the principal if this event is scoped to one.
    /// Events that return `None` are global and should be delivered to all clients.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Self::TxSubmitted { sender, .. } => Some(sender),
            Self::TxConfirmed { sender, .. } => Some(sender),
            Self::MessageSet { owner, .. } => Some(owner),
            Self::MessageCleared { owner, .. } => Some(owner),
            Self::Ready { .. } => None,
        }
    }
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardCommand {
    /// Start receiving events scoped to these principals.
    Subscribe { principals: Vec<String> },

    /// Stop receiving events scoped to these principals.
    Unsubscribe { principals: Vec<String> },
}
