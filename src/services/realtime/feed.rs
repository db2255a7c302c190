//! 变更流到实时汇总的后台任务

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::RealtimeHub;
use crate::models::PeriodWindow;
use crate::services::points::{EventOutcome, LiveTotals, resync_classroom};
use crate::storage::Storage;

async fn resync(storage: &Arc<dyn Storage>, live: &LiveTotals, classroom_id: &str, offset: i32) {
    let window = PeriodWindow::containing(chrono::Utc::now(), offset);
    if let Err(e) = resync_classroom(storage, live, classroom_id, window).await {
        // 保持过期状态，下一次读取时再尝试
        error!("Failed to resync classroom {}: {}", classroom_id, e);
    }
}

/// 持续把事件应用到实时汇总，需要时从存储重新同步
pub fn spawn_live_totals_feed(
    hub: Arc<RealtimeHub>,
    live: Arc<LiveTotals>,
    storage: Arc<dyn Storage>,
    utc_offset_minutes: i32,
) -> tokio::task::JoinHandle<()> {
    let mut rx = hub.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match live.apply_event(&event) {
                    EventOutcome::NeedsResync(classroom_id) => {
                        debug!("Resyncing classroom {} after {:?}", classroom_id, event.event);
                        resync(&storage, &live, &classroom_id, utc_offset_minutes).await;
                    }
                    EventOutcome::Applied(_) | EventOutcome::Ignored => {}
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Live totals feed lagged by {} events", n);
                    live.mark_all_stale();
                    for classroom_id in live.stale_classrooms() {
                        resync(&storage, &live, &classroom_id, utc_offset_minutes).await;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
