use std::sync::Arc;

use tokio::signal;
use tracing::warn;

use crate::services::SyncManager;

pub async fn listen_for_shutdown(sync: Arc<SyncManager>) {
    // 等待 Ctrl+C 信号
    signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
    warn!("Shutdown signal received, initiating graceful shutdown...");

    // 离线队列只在内存中，退出即丢失
    let pending = sync.pending();
    if pending > 0 {
        warn!(
            "Shutting down with {} queued award(s) not yet written ({:?})",
            pending,
            sync.status()
        );
    }
}
