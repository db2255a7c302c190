use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::seating::entities::RoomElementKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct PresetGroup {
    pub letter: String,
    pub x: f64,
    pub y: f64,
    pub rotation: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct PresetElement {
    pub kind: RoomElementKind,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
}

/// 布局快照，不包含学生座位分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct PresetLayout {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub grid_size: f64,
    pub groups: Vec<PresetGroup>,
    pub elements: Vec<PresetElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct LayoutPreset {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub layout: PresetLayout,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
