//! 音效设置的合并与校验

use crate::models::sounds::entities::{SoundEffect, SoundSettings};
use crate::models::sounds::requests::UpdateSoundSettingsRequest;

/// 把更新请求合并进现有设置
///
/// 自定义 URL 传空字符串表示清除。返回需要联网校验的新 URL。
pub fn merge_settings(
    current: &SoundSettings,
    update: UpdateSoundSettingsRequest,
) -> Result<(SoundSettings, Vec<String>), String> {
    let mut next = current.clone();
    let mut to_check = Vec::new();

    if let Some(enabled) = update.enabled {
        next.enabled = enabled;
    }
    if let Some(volume) = update.volume {
        if !(0.0..=1.0).contains(&volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }
        next.volume = volume;
    }
    if let Some(effect) = update.positive_sound {
        if !effect.is_positive() {
            return Err(format!("{effect} is not a positive sound"));
        }
        next.positive_sound = effect;
    }
    if let Some(effect) = update.negative_sound {
        if effect.is_positive() {
            return Err(format!("{effect} is not a negative sound"));
        }
        next.negative_sound = effect;
    }

    for (field, slot) in [
        (update.custom_positive_url, &mut next.custom_positive_url),
        (update.custom_negative_url, &mut next.custom_negative_url),
    ] {
        match field.map(|u| u.trim().to_string()) {
            Some(url) if url.is_empty() => *slot = None,
            Some(url) => {
                if slot.as_deref() != Some(url.as_str()) {
                    to_check.push(url.clone());
                }
                *slot = Some(url);
            }
            None => {}
        }
    }

    Ok((next, to_check))
}

pub fn positive_effects() -> Vec<SoundEffect> {
    SoundEffect::ALL.into_iter().filter(|e| e.is_positive()).collect()
}

pub fn negative_effects() -> Vec<SoundEffect> {
    SoundEffect::ALL.into_iter().filter(|e| !e.is_positive()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_validates_and_clears() {
        let current = SoundSettings {
            custom_negative_url: Some("https://example.com/old.mp3".to_string()),
            ..SoundSettings::default()
        };
        let (next, to_check) = merge_settings(
            &current,
            UpdateSoundSettingsRequest {
                volume: Some(0.25),
                positive_sound: Some(SoundEffect::Coin),
                custom_positive_url: Some(" https://example.com/yay.mp3 ".to_string()),
                custom_negative_url: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(next.volume, 0.25);
        assert_eq!(next.positive_sound, SoundEffect::Coin);
        assert_eq!(next.custom_positive_url.as_deref(), Some("https://example.com/yay.mp3"));
        assert_eq!(next.custom_negative_url, None);
        assert_eq!(to_check, vec!["https://example.com/yay.mp3".to_string()]);
    }

    #[test]
    fn test_merge_rejects_wrong_polarity_and_volume() {
        let current = SoundSettings::default();
        let wrong = UpdateSoundSettingsRequest {
            positive_sound: Some(SoundEffect::Buzz),
            ..Default::default()
        };
        assert!(merge_settings(&current, wrong).is_err());

        let loud = UpdateSoundSettingsRequest {
            volume: Some(1.5),
            ..Default::default()
        };
        assert!(merge_settings(&current, loud).is_err());
    }

    #[test]
    fn test_effect_split() {
        assert_eq!(positive_effects().len(), 4);
        assert_eq!(negative_effects(), vec![SoundEffect::Buzz, SoundEffect::Thud, SoundEffect::Descend]);
    }
}
