use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct AwardPointsRequest {
    pub student_id: String,
    pub behavior_id: String,
    pub note: Option<String>,
}

/// 多选或全班奖励，共用一个 batch_id
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct BatchAwardRequest {
    /// 为空时奖励全班
    #[serde(default)]
    pub student_ids: Vec<String>,
    pub behavior_id: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "transaction.ts")]
pub struct HistoryQuery {
    pub student_id: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}
