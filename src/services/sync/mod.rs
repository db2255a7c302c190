/*!
 * 离线同步管理
 *
 * 记录存储连通状态，离线期间把积分奖励放入重试队列。
 * 状态变更在锁内完成，锁释放后再通知监听者。
 */

pub mod probe;

pub use probe::{is_connectivity_error, replay_pending, spawn_probe};

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::models::system::entities::SyncStatus;
use crate::models::transactions::entities::NewTransaction;

/// 排队中的奖励
#[derive(Debug, Clone)]
pub struct PendingAward {
    pub id: String,
    pub user_id: String,
    pub classroom_id: String,
    pub transactions: Vec<NewTransaction>,
    pub queued_at: chrono::DateTime<chrono::Utc>,
}

impl PendingAward {
    pub fn new(user_id: &str, classroom_id: &str, transactions: Vec<NewTransaction>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            classroom_id: classroom_id.to_string(),
            transactions,
            queued_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull {
    pub capacity: usize,
}

impl std::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sync queue is full ({} pending writes)", self.capacity)
    }
}

pub type ListenerId = u64;
type Listener = Arc<dyn Fn(SyncStatus, usize) + Send + Sync>;

struct SyncState {
    status: SyncStatus,
    queue: VecDeque<PendingAward>,
}

pub struct SyncManager {
    state: Mutex<SyncState>,
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_listener: AtomicU64,
    max_queue: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SyncManager {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            state: Mutex::new(SyncState {
                status: SyncStatus::Online,
                queue: VecDeque::new(),
            }),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            max_queue: config.max_queue.max(1),
        }
    }

    pub fn status(&self) -> SyncStatus {
        lock(&self.state).status
    }

    pub fn is_online(&self) -> bool {
        self.status() != SyncStatus::Offline
    }

    pub fn pending(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// 切换在线状态；状态未变时不通知
    pub fn set_online(&self, online: bool) {
        let changed = {
            let mut state = lock(&self.state);
            let next = match (online, state.status) {
                (false, _) => SyncStatus::Offline,
                (true, SyncStatus::Syncing) => SyncStatus::Syncing,
                (true, _) => SyncStatus::Online,
            };
            let changed = next != state.status;
            state.status = next;
            changed.then_some((next, state.queue.len()))
        };

        if let Some((status, pending)) = changed {
            info!("Sync status changed to {:?} ({} pending)", status, pending);
            self.notify(status, pending);
        }
    }

    /// 放入队列，返回当前排队数
    pub fn enqueue(&self, award: PendingAward) -> Result<usize, QueueFull> {
        let (status, pending) = {
            let mut state = lock(&self.state);
            if state.queue.len() >= self.max_queue {
                warn!("Sync queue full, dropping award for classroom {}", award.classroom_id);
                return Err(QueueFull {
                    capacity: self.max_queue,
                });
            }
            state.queue.push_back(award);
            (state.status, state.queue.len())
        };
        self.notify(status, pending);
        Ok(pending)
    }

    /// 取出全部排队写入，进入同步中状态
    pub fn drain(&self) -> Vec<PendingAward> {
        let (drained, status) = {
            let mut state = lock(&self.state);
            if state.queue.is_empty() {
                return Vec::new();
            }
            let drained: Vec<PendingAward> = state.queue.drain(..).collect();
            if state.status != SyncStatus::Offline {
                state.status = SyncStatus::Syncing;
            }
            (drained, state.status)
        };
        self.notify(status, 0);
        drained
    }

    /// 回放失败的写入放回队首，保持原有顺序
    pub fn requeue_front(&self, awards: Vec<PendingAward>) {
        if awards.is_empty() {
            return;
        }
        let (status, pending) = {
            let mut state = lock(&self.state);
            for award in awards.into_iter().rev() {
                state.queue.push_front(award);
            }
            (state.status, state.queue.len())
        };
        self.notify(status, pending);
    }

    /// 回放结束
    pub fn finish_sync(&self) {
        let changed = {
            let mut state = lock(&self.state);
            if state.status == SyncStatus::Syncing {
                state.status = SyncStatus::Online;
                Some(state.queue.len())
            } else {
                None
            }
        };
        if let Some(pending) = changed {
            self.notify(SyncStatus::Online, pending);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(SyncStatus, usize) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(id, Arc::new(listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        lock(&self.listeners).remove(&id).is_some()
    }

    fn notify(&self, status: SyncStatus, pending: usize) {
        let listeners: Vec<Listener> = lock(&self.listeners).values().cloned().collect();
        for listener in listeners {
            listener(status, pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn award(classroom_id: &str) -> PendingAward {
        PendingAward::new("u1", classroom_id, Vec::new())
    }

    #[test]
    fn test_offline_queue_and_drain() {
        let manager = SyncManager::new(&SyncConfig::default());
        assert_eq!(manager.status(), SyncStatus::Online);

        manager.set_online(false);
        assert!(!manager.is_online());
        assert_eq!(manager.enqueue(award("c1")), Ok(1));
        assert_eq!(manager.enqueue(award("c2")), Ok(2));

        manager.set_online(true);
        assert_eq!(manager.status(), SyncStatus::Online);

        let drained = manager.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].classroom_id, "c1");
        assert_eq!(manager.status(), SyncStatus::Syncing);
        assert_eq!(manager.pending(), 0);

        manager.requeue_front(vec![drained[1].clone()]);
        assert_eq!(manager.pending(), 1);
        manager.finish_sync();
        assert_eq!(manager.status(), SyncStatus::Online);
    }

    #[test]
    fn test_queue_capacity() {
        let manager = SyncManager::new(&SyncConfig {
            probe_interval_secs: 5,
            max_queue: 1,
        });
        assert!(manager.enqueue(award("c1")).is_ok());
        assert_eq!(manager.enqueue(award("c1")), Err(QueueFull { capacity: 1 }));
    }

    #[test]
    fn test_listeners_can_reenter() {
        let manager = Arc::new(SyncManager::new(&SyncConfig::default()));
        let calls = Arc::new(AtomicUsize::new(0));

        let observer = manager.clone();
        let counter = calls.clone();
        let id = manager.subscribe(move |status, _| {
            // 在回调中读取状态不会死锁
            assert_eq!(observer.status(), status);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.set_online(false);
        manager.set_online(false);
        manager.set_online(true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(manager.unsubscribe(id));
        manager.set_online(false);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
