use serde::Serialize;
use ts_rs::TS;

use super::entities::{SoundEffect, SoundSettings};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct SoundSettingsResponse {
    pub settings: SoundSettings,
    pub positive_effects: Vec<SoundEffect>,
    pub negative_effects: Vec<SoundEffect>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct SoundUrlValidationResponse {
    pub valid: bool,
    pub content_type: Option<String>,
    pub error: Option<String>,
}
