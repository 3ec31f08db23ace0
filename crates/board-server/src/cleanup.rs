use std::time::Duration;

use tracing::info;

use board_contract::Executor;

/// Background task that forgets old transaction receipts.
///
/// Runs on an interval and drops receipts applied more than
/// `retention_secs` ago. Pending transactions are never pruned.
pub async fn run_cleanup_loop(executor: Executor, retention_secs: u64, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let retention = retention_window(retention_secs);

    loop {
        interval.tick().await;

        let count = executor.prune_receipts(retention).await;
        if count > 0 {
            info!("Cleanup: pruned {} transaction receipts", count);
        }
    }
}

/// Saturates instead of panicking on values chrono cannot represent.
fn retention_window(retention_secs: u64) -> chrono::Duration {
    i64::try_from(retention_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}
