use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::engine::Engine;
use crate::revocation::RevocationStore;

/// Appends that accumulate before the compactor rewrites the journal.
const COMPACT_THRESHOLD: u64 = 10_000;

/// Background task that compacts the journal once enough appends pile up.
pub async fn run_journal_compactor(engine: Arc<Engine>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let appends = engine.journal_appends_since_compact().await;
        if appends < COMPACT_THRESHOLD {
            continue;
        }
        match engine.compact_journal().await {
            Ok(()) => info!("compacted journal after {appends} appends"),
            Err(e) => debug!("journal compaction skipped: {e}"),
        }
    }
}

/// Background task that sweeps expired entries out of the revocation store.
pub async fn run_revocation_pruner(store: Arc<RevocationStore>) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));
    loop {
        interval.tick().await;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        let removed = store.prune(now);
        if removed > 0 {
            info!("pruned {removed} expired revocations");
        }
    }
}
