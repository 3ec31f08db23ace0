use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info};

use board_types::Value;
use board_types::api::{TxStatus, TxStatusResponse};

use crate::abi::PublicCall;
use crate::board::MessageBoard;
use crate::error::{Response, response_value};
use crate::principal::Principal;

/// Outcome of an applied (or dropped) submission.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub tx_id: String,
    pub sender: Principal,
    pub call: PublicCall,
    /// `None` when the call could not be applied.
    pub response: Option<Response>,
    pub submitted_at: DateTime<Utc>,
    pub applied_at: DateTime<Utc>,
}

impl Receipt {
    pub fn status(&self) -> TxStatus {
        status_of(self.response.as_ref())
    }

    pub fn result(&self) -> Option<Value> {
        self.response.as_ref().map(response_value)
    }
}

/// Lifecycle notifications published by the executor, in order: a
/// transaction's `Submitted` always precedes its `Applied`.
#[derive(Debug, Clone)]
pub enum TxEvent {
    Submitted {
        tx_id: String,
        sender: Principal,
        function: &'static str,
    },
    Applied(Receipt),
}

struct Submission {
    tx_id: String,
    sender: Principal,
    call: PublicCall,
}

struct TxRecord {
    sender: Principal,
    function: &'static str,
    submitted_at: DateTime<Utc>,
    /// Set once the worker has processed the submission.
    outcome: Option<(Option<Response>, DateTime<Utc>)>,
}

/// State shared between the submit side and the worker.
struct TxTable {
    txs: RwLock<HashMap<String, TxRecord>>,
    events_tx: broadcast::Sender<TxEvent>,
}

/// Accepts public calls and applies them to the board one at a time, in
/// submission order. `submit` returns a handle immediately; the outcome is
/// observed through [`Executor::status`] or [`Executor::subscribe`].
#[derive(Clone)]
pub struct Executor {
    queue: mpsc::UnboundedSender<Submission>,
    table: Arc<TxTable>,
    nonce: Arc<AtomicU64>,
}

impl Executor {
    /// Spawn the worker on the current tokio runtime. The worker exits once
    /// every `Executor` handle has been dropped and the queue drains.
    pub fn start(board: Arc<MessageBoard>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(1024);
        let table = Arc::new(TxTable {
            txs: RwLock::new(HashMap::new()),
            events_tx,
        });

        tokio::spawn(run_worker(board, rx, table.clone()));

        Self {
            queue,
            table,
            nonce: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn submit(&self, sender: Principal, call: PublicCall) -> Result<String> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let submitted_at = Utc::now();
        let tx_id = tx_id(&sender, nonce, &call, submitted_at);

        // Record before enqueueing so the id is never unknown to `status`
        self.table.txs.write().await.insert(
            tx_id.clone(),
            TxRecord {
                sender: sender.clone(),
                function: call.function(),
                submitted_at,
                outcome: None,
            },
        );

        debug!("Submitted {} {} from {}", tx_id, call.function(), sender);
        let _ = self.table.events_tx.send(TxEvent::Submitted {
            tx_id: tx_id.clone(),
            sender: sender.clone(),
            function: call.function(),
        });
        if self
            .queue
            .send(Submission {
                tx_id: tx_id.clone(),
                sender,
                call,
            })
            .is_err()
        {
            self.table.txs.write().await.remove(&tx_id);
            return Err(anyhow!("Executor worker has stopped"));
        }

        Ok(tx_id)
    }

    pub async fn status(&self, tx_id: &str) -> Option<TxStatusResponse> {
        let txs = self.table.txs.read().await;
        let record = txs.get(tx_id)?;
        let (status, result, applied_at) = match &record.outcome {
            Some((response, applied_at)) => (
                status_of(response.as_ref()),
                response.as_ref().map(|r| response_value(r).to_string()),
                Some(*applied_at),
            ),
            None => (TxStatus::Pending, None, None),
        };

        Some(TxStatusResponse {
            tx_id: tx_id.to_string(),
            sender: record.sender.to_string(),
            function: record.function.to_string(),
            status,
            result,
            submitted_at: record.submitted_at,
            applied_at,
        })
    }

    /// Submission and receipt events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TxEvent> {
        self.table.events_tx.subscribe()
    }

    /// Forget processed transactions applied more than `retention` ago.
    /// Pending transactions are kept. Returns how many were removed.
    pub async fn prune_receipts(&self, retention: chrono::Duration) -> usize {
        // Nothing is old enough when the window reaches before the earliest representable time
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            return 0;
        };
        let mut txs = self.table.txs.write().await;
        let before = txs.len();
        txs.retain(|_, record| match &record.outcome {
            Some((_, applied_at)) => *applied_at >= cutoff,
            None => true,
        });
        before - txs.len()
    }
}

async fn run_worker(
    board: Arc<MessageBoard>,
    mut rx: mpsc::UnboundedReceiver<Submission>,
    table: Arc<TxTable>,
) {
    info!("Executor worker started");

    while let Some(Submission { tx_id, sender, call }) = rx.recv().await {
        // Apply off the async runtime; awaiting here keeps strict FIFO order
        let b = board.clone();
        let s = sender.clone();
        let c = call.clone();
        let response = match tokio::task::spawn_blocking(move || b.apply(&s, &c)).await {
            Ok(Ok(response)) => Some(response),
            Ok(Err(e)) => {
                error!("Storage error applying {}: {}", tx_id, e);
                None
            }
            Err(e) => {
                error!("spawn_blocking join error: {}", e);
                None
            }
        };
        let applied_at = Utc::now();

        let submitted_at = {
            let mut txs = table.txs.write().await;
            match txs.get_mut(&tx_id) {
                Some(record) => {
                    record.outcome = Some((response, applied_at));
                    record.submitted_at
                }
                None => applied_at,
            }
        };

        let receipt = Receipt {
            tx_id,
            sender,
            call,
            response,
            submitted_at,
            applied_at,
        };
        debug!("Applied {} -> {:?}", receipt.tx_id, receipt.status());
        let _ = table.events_tx.send(TxEvent::Applied(receipt));
    }

    info!("Executor worker stopped");
}

fn status_of(response: Option<&Response>) -> TxStatus {
    match response {
        Some(Ok(_)) => TxStatus::Success,
        Some(Err(_)) => TxStatus::AbortByResponse,
        None => TxStatus::Dropped,
    }
}

fn tx_id(sender: &Principal, nonce: u64, call: &PublicCall, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_str().as_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.update(call.function().as_bytes());
    for arg in call.arguments() {
        hasher.update(arg.to_string().as_bytes());
    }
    hasher.update(at.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MessageText;
    use std::time::Duration;

    fn wallet1() -> Principal {
        Principal::parse("ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5").unwrap()
    }

    fn set(text: &str) -> PublicCall {
        PublicCall::SetMessage(MessageText::new(text).unwrap())
    }

    async fn wait_applied(rx: &mut broadcast::Receiver<TxEvent>, n: usize) -> Vec<Receipt> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for receipt")
                .unwrap();
            if let TxEvent::Applied(receipt) = event {
                out.push(receipt);
            }
        }
        out
    }

    #[tokio::test]
    async fn same_sender_last_write_wins() {
        let board = Arc::new(MessageBoard::in_memory());
        let executor = Executor::start(board.clone());
        let mut rx = executor.subscribe();

        let first = executor.submit(wallet1(), set("one")).await.unwrap();
        let second = executor.submit(wallet1(), set("two")).await.unwrap();
        let third = executor.submit(wallet1(), set("three")).await.unwrap();

        let receipts = wait_applied(&mut rx, 3).await;
        let order: Vec<&str> = receipts.iter().map(|r| r.tx_id.as_str()).collect();
        assert_eq!(order, vec![first.as_str(), second.as_str(), third.as_str()]);
        assert_eq!(board.get_message(&wallet1()).unwrap(), "three");
    }

    #[tokio::test]
    async fn empty_message_aborts_with_u101() {
        let board = Arc::new(MessageBoard::in_memory());
        let executor = Executor::start(board.clone());
        let mut rx = executor.subscribe();

        executor.submit(wallet1(), set("kept")).await.unwrap();
        let tx = executor.submit(wallet1(), set("")).await.unwrap();
        let receipts = wait_applied(&mut rx, 2).await;

        assert_eq!(receipts[1].status(), TxStatus::AbortByResponse);
        assert_eq!(receipts[1].result().unwrap().to_string(), "(err u101)");

        let status = executor.status(&tx).await.unwrap();
        assert_eq!(status.status, TxStatus::AbortByResponse);
        assert_eq!(status.result.as_deref(), Some("(err u101)"));
        assert_eq!(board.get_message(&wallet1()).unwrap(), "kept");
    }

    #[tokio::test]
    async fn status_lifecycle_and_pruning() {
        let board = Arc::new(MessageBoard::in_memory());
        let executor = Executor::start(board);
        let mut rx = executor.subscribe();

        assert!(executor.status("0xdeadbeef").await.is_none());

        let tx = executor.submit(wallet1(), PublicCall::ClearMessage).await.unwrap();
        assert!(tx.starts_with("0x"));
        assert_eq!(tx.len(), 66);

        wait_applied(&mut rx, 1).await;
        let status = executor.status(&tx).await.unwrap();
        assert_eq!(status.status, TxStatus::Success);
        assert_eq!(status.function, "clear-message");
        assert_eq!(status.result.as_deref(), Some("(ok true)"));
        assert!(status.applied_at.is_some());

        // Long retention keeps it, zero retention drops it
        assert_eq!(executor.prune_receipts(chrono::Duration::hours(1)).await, 0);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(executor.prune_receipts(chrono::Duration::zero()).await, 1);
        assert!(executor.status(&tx).await.is_none());
    }

    #[tokio::test]
    async fn pruning_with_huge_retention_keeps_everything() {
        let executor = Executor::start(Arc::new(MessageBoard::in_memory()));
        let mut rx = executor.subscribe();

        let tx = executor.submit(wallet1(), PublicCall::ClearMessage).await.unwrap();
        wait_applied(&mut rx, 1).await;

        let huge = chrono::Duration::seconds(10_000_000_000_000);
        assert_eq!(executor.prune_receipts(huge).await, 0);
        assert_eq!(executor.prune_receipts(chrono::Duration::MAX).await, 0);
        assert!(executor.status(&tx).await.is_some());
    }

    #[tokio::test]
    async fn submitted_precedes_applied() {
        let executor = Executor::start(Arc::new(MessageBoard::in_memory()));
        let mut rx = executor.subscribe();

        let tx = executor.submit(wallet1(), set("hi")).await.unwrap();
        match rx.recv().await.unwrap() {
            TxEvent::Submitted { tx_id, function, .. } => {
                assert_eq!(tx_id, tx);
                assert_eq!(function, "set-message");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.recv().await.unwrap(), TxEvent::Applied(r) if r.tx_id == tx));
    }

    #[test]
    fn tx_ids_differ_by_nonce() {
        let at = Utc::now();
        let a = tx_id(&wallet1(), 0, &PublicCall::ClearMessage, at);
        let b = tx_id(&wallet1(), 1, &PublicCall::ClearMessage, at);
        assert_ne!(a, b);
    }
}
