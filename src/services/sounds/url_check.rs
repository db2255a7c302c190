//! 自定义音效地址校验
//!
//! 只接受 HTTPS 地址；通过 HEAD 请求确认可访问且 `Content-Type` 是音频。

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::config::SoundConfig;

static SOUND_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*(?::\d{1,5})?(?:/[^\s]*)?$")
        .expect("Invalid sound url regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCheckError {
    NotHttps,
    Malformed,
    Unreachable(String),
    BadStatus(u16),
    NotAudio(Option<String>),
}

impl std::fmt::Display for UrlCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlCheckError::NotHttps => write!(f, "Sound URL must use HTTPS"),
            UrlCheckError::Malformed => write!(f, "Sound URL is not a valid URL"),
            UrlCheckError::Unreachable(e) => write!(f, "Sound URL is unreachable: {e}"),
            UrlCheckError::BadStatus(code) => write!(f, "Sound URL returned HTTP {code}"),
            UrlCheckError::NotAudio(Some(ct)) => write!(f, "Sound URL is not audio ({ct})"),
            UrlCheckError::NotAudio(None) => write!(f, "Sound URL has no content type"),
        }
    }
}

pub fn validate_url_format(url: &str) -> Result<(), UrlCheckError> {
    let url = url.trim();
    if !url.to_ascii_lowercase().starts_with("https://") {
        return Err(UrlCheckError::NotHttps);
    }
    if !SOUND_URL_RE.is_match(url) {
        return Err(UrlCheckError::Malformed);
    }
    Ok(())
}

/// `audio/*` 或配置中额外允许的类型
pub fn is_audio_content_type(content_type: &str, allowed: &[String]) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("audio/") || allowed.iter().any(|a| a.eq_ignore_ascii_case(&mime))
}

pub fn build_client(config: &SoundConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.url_check_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// 完整校验，成功时返回内容类型
pub async fn check_sound_url(
    client: &reqwest::Client,
    url: &str,
    config: &SoundConfig,
) -> Result<String, UrlCheckError> {
    validate_url_format(url)?;

    let response = client
        .head(url.trim())
        .send()
        .await
        .map_err(|e| UrlCheckError::Unreachable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(UrlCheckError::BadStatus(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match content_type {
        Some(ct) if is_audio_content_type(&ct, &config.allowed_content_types) => Ok(ct),
        other => Err(UrlCheckError::NotAudio(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rules() {
        assert!(validate_url_format("https://cdn.example.com/sounds/ding.mp3").is_ok());
        assert!(validate_url_format("https://example.com:8443/a.ogg?v=2").is_ok());
        assert_eq!(
            validate_url_format("http://example.com/a.mp3"),
            Err(UrlCheckError::NotHttps)
        );
        assert_eq!(
            validate_url_format("https://exa mple.com/a.mp3"),
            Err(UrlCheckError::Malformed)
        );
        assert_eq!(validate_url_format("https://"), Err(UrlCheckError::Malformed));
    }

    #[test]
    fn test_content_type_allow_list() {
        let allowed = SoundConfig::default().allowed_content_types;
        assert!(is_audio_content_type("audio/mpeg", &allowed));
        assert!(is_audio_content_type("Audio/Wav; charset=binary", &allowed));
        assert!(is_audio_content_type("application/octet-stream", &allowed));
        assert!(!is_audio_content_type("text/html; charset=utf-8", &allowed));
    }

    #[tokio::test]
    async fn test_rejects_before_network() {
        let config = SoundConfig::default();
        let client = build_client(&config).unwrap();
        let result = check_sound_url(&client, "ftp://example.com/a.mp3", &config).await;
        assert_eq!(result, Err(UrlCheckError::NotHttps));
    }
}
