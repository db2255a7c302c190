use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::PointTotals;

// 班级实体，积分字段为冗余汇总
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct Classroom {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub point_total: i64,
    pub positive_total: i64,
    pub negative_total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Classroom {
    /// 存储中的累计值，today/this_week 为 0
    pub fn stored_totals(&self) -> PointTotals {
        PointTotals {
            total: self.point_total,
            positive: self.positive_total,
            negative: self.negative_total,
            ..Default::default()
        }
    }
}

// 排行榜类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "classroom.ts")]
pub enum LeaderboardCategory {
    #[default]
    Total,
    Positive,
    Negative,
    Today,
    Week,
    Ratio,
}
