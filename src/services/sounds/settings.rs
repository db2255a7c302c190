use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, warn};

use super::catalog::{merge_settings, negative_effects, positive_effects};
use super::url_check::{UrlCheckError, check_sound_url};
use super::{SoundService, url_error_code};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::sounds::entities::SoundSettings;
use crate::models::sounds::requests::{UpdateSoundSettingsRequest, ValidateSoundUrlRequest};
use crate::models::sounds::responses::{SoundSettingsResponse, SoundUrlValidationResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::unauthorized;

fn settings_response(settings: SoundSettings) -> SoundSettingsResponse {
    SoundSettingsResponse {
        settings,
        positive_effects: positive_effects(),
        negative_effects: negative_effects(),
    }
}

async fn check_url(service: &SoundService, url: &str) -> Result<String, UrlCheckError> {
    let client = service
        .client()
        .map_err(|e| UrlCheckError::Unreachable(e.to_string()))?;
    check_sound_url(client, url, &AppConfig::get().sound).await
}

/// 未保存过时返回默认设置
pub async fn get_settings(
    service: &SoundService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match storage.get_sound_settings(&uid).await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            settings_response(settings.unwrap_or_default()),
            "Sound settings retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to load sound settings for {}: {}", uid, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load sound settings: {e}"),
            )))
        }
    }
}

/// 新的自定义地址必须通过联网校验才会保存
pub async fn update_settings(
    service: &SoundService,
    request: &HttpRequest,
    body: UpdateSoundSettingsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    let current = match storage.get_sound_settings(&uid).await {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load sound settings: {e}"),
            )));
        }
    };

    let (next, to_check) = match merge_settings(&current, body) {
        Ok(merged) => merged,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    for url in &to_check {
        if let Err(e) = check_url(service, url).await {
            warn!("Rejected custom sound url for {}: {}", uid, e);
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(url_error_code(&e), e.to_string())));
        }
    }

    match storage.upsert_sound_settings(&uid, next).await {
        Ok(saved) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            settings_response(saved),
            "Sound settings updated successfully",
        ))),
        Err(e) => {
            error!("Failed to save sound settings for {}: {}", uid, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to save sound settings: {e}"),
            )))
        }
    }
}

/// 只校验不保存；校验失败也返回 200，由 valid 字段区分
pub async fn validate_url(
    service: &SoundService,
    body: ValidateSoundUrlRequest,
) -> ActixResult<HttpResponse> {
    let result = match check_url(service, &body.url).await {
        Ok(content_type) => SoundUrlValidationResponse {
            valid: true,
            content_type: Some(content_type),
            error: None,
        },
        Err(e) => SoundUrlValidationResponse {
            valid: false,
            content_type: match &e {
                UrlCheckError::NotAudio(ct) => ct.clone(),
                _ => None,
            },
            error: Some(e.to_string()),
        },
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Sound URL checked")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_validate_rejects_plain_http_without_request() {
        let service = SoundService::new_lazy();
        let resp = validate_url(
            &service,
            ValidateSoundUrlRequest {
                url: "http://example.com/ding.mp3".to_string(),
            },
        )
        .await
        .unwrap();

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["valid"], false);
        assert_eq!(json["data"]["error"], "Sound URL must use HTTPS");
    }
}
