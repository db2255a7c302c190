//! 变更事件广播中心
//!
//! 所有写操作完成后把行变更发布到一个广播通道，
//! WebSocket 会话和实时汇总任务各自订阅。

use std::collections::HashSet;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::RealtimeConfig;
use crate::models::realtime::entities::{ChangeEvent, ChangeKind, ChangeTable};
use crate::models::realtime::responses::RealtimeStats;

/// 订阅条件；classroom_id 为空表示该表的全部行
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub table: ChangeTable,
    pub classroom_id: Option<String>,
}

impl Subscription {
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.table == event.table
            && self
                .classroom_id
                .as_ref()
                .is_none_or(|id| event.classroom_id.as_ref() == Some(id))
    }
}

struct Connection {
    user_id: String,
    subscriptions: HashSet<Subscription>,
}

pub struct RealtimeHub {
    sender: broadcast::Sender<ChangeEvent>,
    connections: DashMap<String, Connection>,
    full_row_images: bool,
}

/// old 镜像只保留主键
fn key_only(old: Value) -> Value {
    match old {
        Value::Object(map) => {
            let mut key = Map::new();
            if let Some(id) = map.get("id") {
                key.insert("id".to_string(), id.clone());
            }
            Value::Object(key)
        }
        other => other,
    }
}

impl RealtimeHub {
    pub fn new(config: &RealtimeConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(16));
        Self {
            sender,
            connections: DashMap::new(),
            full_row_images: config.full_row_images,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// 发布事件，返回接收者数量
    pub fn publish(&self, mut event: ChangeEvent) -> usize {
        if !self.full_row_images {
            event.old = event.old.map(key_only);
        }
        debug!(
            "Publishing {:?} {:?} for classroom {:?}",
            event.event, event.table, event.classroom_id
        );
        self.sender.send(event).unwrap_or(0)
    }

    /// 序列化行并发布
    pub fn publish_row<T: Serialize>(
        &self,
        table: ChangeTable,
        kind: ChangeKind,
        owner_id: Option<&str>,
        classroom_id: Option<&str>,
        new: Option<&T>,
        old: Option<&T>,
    ) {
        let encode = |row: Option<&T>| -> Result<Option<Value>, serde_json::Error> {
            row.map(serde_json::to_value).transpose()
        };
        let (new, old) = match (encode(new), encode(old)) {
            (Ok(new), Ok(old)) => (new, old),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to encode {:?} change: {}", table, e);
                return;
            }
        };

        self.publish(ChangeEvent {
            table,
            event: kind,
            owner_id: owner_id.map(str::to_string),
            classroom_id: classroom_id.map(str::to_string),
            new,
            old,
            commit_timestamp: chrono::Utc::now(),
        });
    }

    pub fn register(&self, connection_id: &str, user_id: &str) {
        self.connections.insert(
            connection_id.to_string(),
            Connection {
                user_id: user_id.to_string(),
                subscriptions: HashSet::new(),
            },
        );
    }

    pub fn unregister(&self, connection_id: &str) {
        self.connections.remove(connection_id);
    }

    pub fn add_subscription(&self, connection_id: &str, subscription: Subscription) -> bool {
        self.connections
            .get_mut(connection_id)
            .is_some_and(|mut conn| conn.subscriptions.insert(subscription))
    }

    pub fn remove_subscription(&self, connection_id: &str, subscription: &Subscription) -> bool {
        self.connections
            .get_mut(connection_id)
            .is_some_and(|mut conn| conn.subscriptions.remove(subscription))
    }

    /// 该连接是否应收到此事件：事件属于该用户（或无归属）且命中订阅
    pub fn should_deliver(&self, connection_id: &str, event: &ChangeEvent) -> bool {
        self.connections.get(connection_id).is_some_and(|conn| {
            event
                .owner_id
                .as_deref()
                .is_none_or(|owner| owner == conn.user_id)
                && conn.subscriptions.iter().any(|s| s.matches(event))
        })
    }

    pub fn stats(&self) -> RealtimeStats {
        RealtimeStats {
            connections: self.connections.len(),
            subscriptions: self
                .connections
                .iter()
                .map(|conn| conn.subscriptions.len())
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(owner: &str, classroom: &str) -> ChangeEvent {
        ChangeEvent {
            table: ChangeTable::Students,
            event: ChangeKind::Update,
            owner_id: Some(owner.to_string()),
            classroom_id: Some(classroom.to_string()),
            new: Some(json!({"id": "s1", "point_total": 3})),
            old: Some(json!({"id": "s1", "point_total": 0})),
            commit_timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_key_only_old_images() {
        let hub = RealtimeHub::new(&RealtimeConfig {
            full_row_images: false,
            ..Default::default()
        });
        let mut rx = hub.subscribe();
        assert_eq!(hub.publish(event("u1", "c1")), 1);

        let received = rx.recv().await.unwrap();
        assert!(received.has_key_only_old());
        assert_eq!(received.old, Some(json!({"id": "s1"})));
        assert_eq!(received.new.unwrap()["point_total"], 3);
    }

    #[tokio::test]
    async fn test_full_row_images_kept() {
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        let mut rx = hub.subscribe();
        hub.publish(event("u1", "c1"));
        assert!(!rx.recv().await.unwrap().has_key_only_old());
    }

    #[test]
    fn test_delivery_filters() {
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        hub.register("conn", "u1");
        assert!(!hub.should_deliver("conn", &event("u1", "c1")));

        assert!(hub.add_subscription(
            "conn",
            Subscription {
                table: ChangeTable::Students,
                classroom_id: Some("c1".to_string()),
            }
        ));
        assert!(hub.should_deliver("conn", &event("u1", "c1")));
        assert!(!hub.should_deliver("conn", &event("u1", "c2")));
        assert!(!hub.should_deliver("conn", &event("u2", "c1")));

        let stats = hub.stats();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.subscriptions, 1);

        hub.unregister("conn");
        assert!(!hub.should_deliver("conn", &event("u1", "c1")));
    }
}
