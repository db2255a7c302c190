use serde::Serialize;
use ts_rs::TS;

use super::entities::{Classroom, LeaderboardCategory};
use crate::models::common::PointTotals;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct ClassroomSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub classroom: Classroom,
    pub student_count: u64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct ClassroomListResponse {
    pub items: Vec<ClassroomSummary>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student_id: String,
    pub name: String,
    /// 排序依据；ratio 类别为小数，其余类别为整数值
    pub score: f64,
    pub totals: PointTotals,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct LeaderboardResponse {
    pub category: LeaderboardCategory,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct StudentLiveTotals {
    pub student_id: String,
    pub totals: PointTotals,
}

/// 实时汇总视图
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct LiveTotalsResponse {
    pub classroom_id: String,
    pub classroom: PointTotals,
    pub students: Vec<StudentLiveTotals>,
    /// 本次读取前是否从存储重新同步
    pub resynced: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct ResetPointsResponse {
    pub deleted_transactions: u64,
}
