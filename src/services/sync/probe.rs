//! 连通性探测与队列回放

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::SyncManager;
use crate::errors::ClassPointsError;
use crate::services::points::{LiveTotals, commit_award, current_window};
use crate::services::realtime::RealtimeHub;
use crate::storage::Storage;

/// 存储不可达类错误会让同步管理器转为离线
pub fn is_connectivity_error(err: &ClassPointsError) -> bool {
    matches!(
        err,
        ClassPointsError::DatabaseConnection(_) | ClassPointsError::Network(_)
    )
}

/// 回放全部排队写入，返回成功条数；遇到连通性错误时剩余部分放回队首
pub async fn replay_pending(
    sync: &SyncManager,
    storage: &Arc<dyn Storage>,
    live: &LiveTotals,
    hub: &RealtimeHub,
) -> usize {
    let mut pending = sync.drain().into_iter();
    let mut replayed = 0;

    while let Some(award) = pending.next() {
        let result = commit_award(
            storage,
            live,
            hub,
            &award.user_id,
            &award.classroom_id,
            award.transactions.clone(),
            current_window(),
        )
        .await;

        match result {
            Ok(_) => replayed += 1,
            Err(e) if is_connectivity_error(&e) => {
                warn!("Replay interrupted, storage unreachable: {}", e);
                let mut rest = vec![award];
                rest.extend(pending);
                sync.requeue_front(rest);
                sync.set_online(false);
                return replayed;
            }
            Err(e) => {
                // 班级或学生已被删除等，丢弃这一条
                warn!("Dropping queued award {}: {}", award.id, e);
            }
        }
    }

    sync.finish_sync();
    replayed
}

pub fn spawn_probe(
    sync: Arc<SyncManager>,
    storage: Arc<dyn Storage>,
    live: Arc<LiveTotals>,
    hub: Arc<RealtimeHub>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            match storage.ping().await {
                Ok(()) => {
                    sync.set_online(true);
                    if sync.pending() > 0 {
                        let replayed = replay_pending(&sync, &storage, &live, &hub).await;
                        info!("Replayed {} queued awards", replayed);
                    }
                }
                Err(e) => {
                    debug!("Storage probe failed: {}", e);
                    sync.set_online(false);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RealtimeConfig, SyncConfig};
    use crate::models::system::entities::SyncStatus;
    use crate::models::transactions::entities::NewTransaction;
    use crate::services::sync::PendingAward;
    use crate::storage::sea_orm_storage::test_support::classroom_with_students;

    #[tokio::test]
    async fn test_replay_writes_queued_awards() {
        let (storage, user_id, classroom_id, student_ids) =
            classroom_with_students(&["Ann", "Ben"]).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let live = LiveTotals::new();
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        let sync = SyncManager::new(&SyncConfig::default());

        sync.set_online(false);
        for student_id in &student_ids {
            let tx = NewTransaction {
                student_id: student_id.clone(),
                behavior_id: None,
                behavior_name: "On Task".to_string(),
                behavior_icon: "✅".to_string(),
                points: 2,
                note: None,
                batch_id: None,
                created_at: chrono::Utc::now(),
            };
            sync.enqueue(PendingAward::new(&user_id, &classroom_id, vec![tx]))
                .unwrap();
        }
        // 指向不存在班级的写入会被丢弃
        sync.enqueue(PendingAward::new(&user_id, "missing", Vec::new()))
            .unwrap();

        sync.set_online(true);
        let replayed = replay_pending(&sync, &storage, &live, &hub).await;
        assert_eq!(replayed, 2);
        assert_eq!(sync.pending(), 0);
        assert_eq!(sync.status(), SyncStatus::Online);

        let classroom = storage.get_classroom(&classroom_id).await.unwrap().unwrap();
        assert_eq!(classroom.point_total, 4);
    }
}
