use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 可订阅的表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "realtime.ts")]
pub enum ChangeTable {
    Classrooms,
    Students,
    Behaviors,
    PointTransactions,
    SeatingCharts,
    SeatingGroups,
    SeatingSeats,
    RoomElements,
    LayoutPresets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "realtime.ts")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// 行变更事件
///
/// `old` 在未开启完整行镜像时只包含主键。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "realtime.ts")]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub event: ChangeKind,
    /// 所属用户，用于过滤推送对象
    #[serde(skip)]
    #[ts(skip)]
    pub owner_id: Option<String>,
    pub classroom_id: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub new: Option<serde_json::Value>,
    #[ts(type = "Record<string, unknown> | null")]
    pub old: Option<serde_json::Value>,
    pub commit_timestamp: chrono::DateTime<chrono::Utc>,
}

impl ChangeEvent {
    /// old 镜像是否只有主键
    pub fn has_key_only_old(&self) -> bool {
        match &self.old {
            Some(serde_json::Value::Object(map)) => map.len() <= 1,
            _ => false,
        }
    }
}

/// 客户端消息
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "realtime.ts")]
pub enum ClientMessage {
    Subscribe {
        table: ChangeTable,
        classroom_id: Option<String>,
    },
    Unsubscribe {
        table: ChangeTable,
        classroom_id: Option<String>,
    },
    Ping,
}

/// 服务端消息
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "realtime.ts")]
pub enum ServerMessage {
    Subscribed {
        table: ChangeTable,
        classroom_id: Option<String>,
    },
    Unsubscribed {
        table: ChangeTable,
        classroom_id: Option<String>,
    },
    Change(ChangeEvent),
    Pong,
    Error {
        message: String,
    },
}
