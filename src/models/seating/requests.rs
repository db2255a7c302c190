use serde::Deserialize;
use ts_rs::TS;

use super::entities::RoomElementKind;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct UpdateChartRequest {
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
    pub grid_size: Option<f64>,
    pub snap_enabled: Option<bool>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct CreateGroupRequest {
    pub x: f64,
    pub y: f64,
    /// 是否已按住修饰键临时关闭吸附
    #[serde(default)]
    pub snap_override: bool,
}

/// 拖动结束时提交的位置（未吸附的原始坐标）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct MoveRequest {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub snap_override: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct CreateElementRequest {
    pub kind: RoomElementKind,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub snap_override: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct UpdateElementRequest {
    pub label: Option<String>,
}

/// 缩放：拖动手柄及指针相对拖动起点的位移
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct ResizeElementRequest {
    pub handle: String,
    pub dx: f64,
    pub dy: f64,
    #[serde(default)]
    pub snap_override: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct AssignSeatRequest {
    pub student_id: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct ApplyPresetRequest {
    pub preset_id: String,
}
