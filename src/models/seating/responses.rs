use serde::Serialize;
use ts_rs::TS;

use super::entities::SeatingChart;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct RandomizeResponse {
    pub chart: SeatingChart,
    /// 座位不足时未能入座的学生
    pub unseated_student_ids: Vec<String>,
}

/// 座位视图位置（竖向旋转时含居中偏移）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct RotateResponse {
    pub id: String,
    pub rotation: i32,
    pub x: f64,
    pub y: f64,
}
