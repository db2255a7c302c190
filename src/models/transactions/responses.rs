use serde::Serialize;
use ts_rs::TS;

use super::entities::PointTransaction;
use crate::models::common::PointTotals;
use crate::models::students::entities::Student;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct AwardResponse {
    pub transactions: Vec<PointTransaction>,
    pub students: Vec<Student>,
    pub classroom_totals: PointTotals,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct UndoResponse {
    pub undone: Vec<PointTransaction>,
    pub batch_id: Option<String>,
    pub classroom_totals: PointTotals,
}

/// 当前可撤销的单元
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct UndoableResponse {
    pub transactions: Vec<PointTransaction>,
    pub batch_id: Option<String>,
    pub points: i64,
    /// 剩余可撤销时间（毫秒）
    pub expires_in_ms: i64,
}

/// 离线时奖励被放入同步队列
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct QueuedAwardResponse {
    pub queue_id: String,
    pub pending: usize,
}
