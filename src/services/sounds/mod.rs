/*!
 * 音效
 *
 * 内置音效由服务端合成为 WAV；自定义音效只保存 HTTPS 地址，
 * 保存前通过 HEAD 请求确认可访问且为音频。
 */

pub mod catalog;
pub mod settings;
pub mod synth;
pub mod url_check;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::error;

use crate::config::AppConfig;
use crate::models::sounds::entities::SoundEffect;
use crate::models::sounds::requests::{
    RenderSoundQuery, UpdateSoundSettingsRequest, ValidateSoundUrlRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub use catalog::merge_settings;
pub use synth::{encode_wav, render_wav, synthesize};
pub use url_check::{UrlCheckError, check_sound_url};

const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 96_000;

pub struct SoundService {
    storage: Option<Arc<dyn Storage>>,
    client: OnceCell<reqwest::Client>,
}

impl SoundService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            client: OnceCell::new(),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 复用同一个 HTTP 客户端
    pub(crate) fn client(&self) -> Result<&reqwest::Client, reqwest::Error> {
        self.client
            .get_or_try_init(|| url_check::build_client(&AppConfig::get().sound))
    }

    pub async fn get_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_settings(self, request).await
    }

    pub async fn update_settings(
        &self,
        request: &HttpRequest,
        body: UpdateSoundSettingsRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_settings(self, request, body).await
    }

    pub async fn validate_url(&self, body: ValidateSoundUrlRequest) -> ActixResult<HttpResponse> {
        settings::validate_url(self, body).await
    }

    /// 合成内置音效并以 WAV 返回
    pub async fn render_effect(
        &self,
        effect: &str,
        query: RenderSoundQuery,
    ) -> ActixResult<HttpResponse> {
        let effect: SoundEffect = match effect.trim_end_matches(".wav").parse() {
            Ok(effect) => effect,
            Err(msg) => {
                return Ok(HttpResponse::NotFound()
                    .json(ApiResponse::error_empty(ErrorCode::NotFound, msg)));
            }
        };
        let sample_rate = query
            .sample_rate
            .unwrap_or(AppConfig::get().sound.sample_rate);
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("Sample rate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE}"),
            )));
        }

        let rendered = actix_web::web::block(move || render_wav(effect, sample_rate)).await;
        match rendered {
            Ok(Ok(wav)) => Ok(HttpResponse::Ok()
                .content_type("audio/wav")
                .insert_header(("Cache-Control", "public, max-age=86400"))
                .body(wav)),
            Ok(Err(e)) => {
                error!("Failed to render {}: {}", effect, e);
                Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to render sound: {e}"),
                )))
            }
            Err(e) => {
                error!("Sound render task failed: {}", e);
                Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to render sound",
                )))
            }
        }
    }
}

/// URL 校验错误对应的错误码
pub fn url_error_code(err: &UrlCheckError) -> ErrorCode {
    match err {
        UrlCheckError::NotHttps | UrlCheckError::Malformed => ErrorCode::SoundUrlInvalid,
        UrlCheckError::Unreachable(_) | UrlCheckError::BadStatus(_) => {
            ErrorCode::SoundUrlUnreachable
        }
        UrlCheckError::NotAudio(_) => ErrorCode::SoundUrlNotAudio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_render_effect_returns_wav() {
        let service = SoundService::new_lazy();
        let resp = service
            .render_effect(
                "coin.wav",
                RenderSoundQuery {
                    sample_rate: Some(8000),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[0..4], b"RIFF");
        assert_eq!(&body[8..12], b"WAVE");
    }

    #[actix_web::test]
    async fn test_render_rejects_unknown_and_bad_rate() {
        let service = SoundService::new_lazy();
        let resp = service
            .render_effect("kazoo", RenderSoundQuery { sample_rate: None })
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .render_effect(
                "chime",
                RenderSoundQuery {
                    sample_rate: Some(100),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_url_error_codes() {
        assert_eq!(url_error_code(&UrlCheckError::NotHttps), ErrorCode::SoundUrlInvalid);
        assert_eq!(
            url_error_code(&UrlCheckError::BadStatus(404)),
            ErrorCode::SoundUrlUnreachable
        );
        assert_eq!(
            url_error_code(&UrlCheckError::NotAudio(None)),
            ErrorCode::SoundUrlNotAudio
        );
    }
}
