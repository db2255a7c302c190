use serde::Deserialize;
use ts_rs::TS;

use super::entities::SoundEffect;

/// 音效设置更新；自定义 URL 传空字符串表示清除
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct UpdateSoundSettingsRequest {
    pub enabled: Option<bool>,
    pub volume: Option<f64>,
    pub positive_sound: Option<SoundEffect>,
    pub negative_sound: Option<SoundEffect>,
    pub custom_positive_url: Option<String>,
    pub custom_negative_url: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct ValidateSoundUrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct RenderSoundQuery {
    pub sample_rate: Option<u32>,
}
