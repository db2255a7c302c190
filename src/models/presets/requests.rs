use serde::Deserialize;
use ts_rs::TS;

/// 从某个班级当前座位表保存预设
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct CreatePresetRequest {
    pub name: String,
    pub classroom_id: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct RenamePresetRequest {
    pub name: String,
}
