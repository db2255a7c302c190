use serde::Serialize;
use ts_rs::TS;

use super::entities::LayoutPreset;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "preset.ts")]
pub struct PresetListResponse {
    pub items: Vec<LayoutPreset>,
}
