use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 内置音效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "sound.ts")]
pub enum SoundEffect {
    Chime,
    Sparkle,
    Coin,
    Fanfare,
    Buzz,
    Thud,
    Descend,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 7] = [
        SoundEffect::Chime,
        SoundEffect::Sparkle,
        SoundEffect::Coin,
        SoundEffect::Fanfare,
        SoundEffect::Buzz,
        SoundEffect::Thud,
        SoundEffect::Descend,
    ];

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            SoundEffect::Chime | SoundEffect::Sparkle | SoundEffect::Coin | SoundEffect::Fanfare
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Chime => "chime",
            SoundEffect::Sparkle => "sparkle",
            SoundEffect::Coin => "coin",
            SoundEffect::Fanfare => "fanfare",
            SoundEffect::Buzz => "buzz",
            SoundEffect::Thud => "thud",
            SoundEffect::Descend => "descend",
        }
    }
}

impl std::fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SoundEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundEffect::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("Invalid sound effect: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sound.ts")]
pub struct SoundSettings {
    pub enabled: bool,
    pub volume: f64,
    pub positive_sound: SoundEffect,
    pub negative_sound: SoundEffect,
    pub custom_positive_url: Option<String>,
    pub custom_negative_url: Option<String>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.7,
            positive_sound: SoundEffect::Chime,
            negative_sound: SoundEffect::Buzz,
            custom_positive_url: None,
            custom_negative_url: None,
            updated_at: None,
        }
    }
}
