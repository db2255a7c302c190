use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 积分流水；behavior_name/behavior_icon 为奖励时的快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct PointTransaction {
    pub id: String,
    pub student_id: String,
    pub classroom_id: String,
    pub behavior_id: Option<String>,
    pub behavior_name: String,
    pub behavior_icon: String,
    pub points: i32,
    pub note: Option<String>,
    pub batch_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 写入一条流水所需的数据（存储层使用）
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub student_id: String,
    pub behavior_id: Option<String>,
    pub behavior_name: String,
    pub behavior_icon: String,
    pub points: i32,
    pub note: Option<String>,
    pub batch_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 奖励或撤销写入后的最新行（用于推送完整行镜像）
#[derive(Debug, Clone)]
pub struct PointsWriteOutcome {
    pub transactions: Vec<PointTransaction>,
    pub students: Vec<crate::models::students::entities::Student>,
    pub classroom: crate::models::classrooms::entities::Classroom,
}
