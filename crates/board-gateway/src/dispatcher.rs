use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use board_contract::{PublicCall, Receipt, TxEvent};
use board_types::events::BoardEvent;

/// Fans out board events to every connected client.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for board events; connections filter by subscription
    broadcast_tx: broadcast::Sender<BoardEvent>,

    /// Number of live WebSocket connections
    connections: AtomicUsize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                connections: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to board events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: BoardEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    pub fn connection_opened(&self) {
        self.inner.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.inner.connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.load(Ordering::Relaxed)
    }

    /// Turn executor events into board events until the executor goes away.
    pub fn forward_tx_events(&self, mut tx_events: broadcast::Receiver<TxEvent>) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            loop {
                match tx_events.recv().await {
                    Ok(TxEvent::Submitted { tx_id, sender, function }) => {
                        dispatcher.broadcast(BoardEvent::TxSubmitted {
                            tx_id,
                            sender: sender.to_string(),
                            function: function.to_string(),
                        });
                    }
                    Ok(TxEvent::Applied(receipt)) => {
                        for event in receipt_events(&receipt) {
                            dispatcher.broadcast(event);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Transaction event forwarder lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            info!("Transaction event forwarder stopped");
        })
    }
}

/// Events describing one processed transaction: always a `TxConfirmed`,
/// followed by the resulting state change when the call succeeded.
pub fn receipt_events(receipt: &Receipt) -> Vec<BoardEvent> {
    let sender = receipt.sender.to_string();
    let mut events = vec![BoardEvent::TxConfirmed {
        tx_id: receipt.tx_id.clone(),
        sender: sender.clone(),
        function: receipt.call.function().to_string(),
        status: receipt.status(),
        result: receipt
            .result()
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }];

    if let Some(Ok(_)) = receipt.response {
        let timestamp = receipt.applied_at;
        events.push(match &receipt.call {
            PublicCall::SetMessage(text) => BoardEvent::MessageSet {
                owner: sender,
                text: text.to_string(),
                timestamp,
            },
            PublicCall::ClearMessage => BoardEvent::MessageCleared {
                owner: sender,
                timestamp,
            },
        });
    }

    events
}
