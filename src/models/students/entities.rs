use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::PointTotals;

// 学生实体；today_total/this_week_total 在读取时由流水推导
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct Student {
    pub id: String,
    pub classroom_id: String,
    pub name: String,
    pub avatar_color: Option<String>,
    pub point_total: i64,
    pub positive_total: i64,
    pub negative_total: i64,
    pub today_total: i64,
    pub this_week_total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn totals(&self) -> PointTotals {
        PointTotals {
            total: self.point_total,
            positive: self.positive_total,
            negative: self.negative_total,
            today: self.today_total,
            this_week: self.this_week_total,
        }
    }
}
