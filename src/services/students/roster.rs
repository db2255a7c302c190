//! 名单预览
//!
//! 只解析不写入；前端确认后再调用批量创建。

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use tracing::debug;

use super::name_parser::{display_names, parse_roster};
use crate::config::AppConfig;
use crate::models::students::requests::ParseRosterRequest;
use crate::models::students::responses::RosterPreviewResponse;
use crate::models::{ApiResponse, ErrorCode};

fn preview_response(content: &str, filename: Option<&str>) -> HttpResponse {
    let parsed = parse_roster(content, filename);
    debug!(
        "Roster parsed: {} names, {} errors",
        parsed.names.len(),
        parsed.errors.len()
    );
    if parsed.names.is_empty() {
        return HttpResponse::UnprocessableEntity().json(ApiResponse::error(
            ErrorCode::RosterParseFailed,
            RosterPreviewResponse {
                names: Vec::new(),
                display_names: Vec::new(),
                errors: parsed.errors,
            },
            "No student names found",
        ));
    }

    let display = display_names(&parsed.names);
    HttpResponse::Ok().json(ApiResponse::success(
        RosterPreviewResponse {
            names: parsed.names,
            display_names: display,
            errors: parsed.errors,
        },
        "Roster parsed successfully",
    ))
}

pub async fn preview_roster(body: ParseRosterRequest) -> ActixResult<HttpResponse> {
    Ok(preview_response(&body.content, body.filename.as_deref()))
}

/// multipart 字段 `file`，内容须为 UTF-8 文本
pub async fn upload_roster(mut payload: Multipart) -> ActixResult<HttpResponse> {
    let max_size = AppConfig::get().server.limits.max_payload_size;
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        if name != "file" {
            continue;
        }
        if content.is_some() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Only one roster file can be uploaded at a time",
            )));
        }
        filename = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());

        let mut buffer = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if buffer.len() + data.len() > max_size {
                return Ok(HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "Roster file is too large",
                )));
            }
            buffer.extend_from_slice(&data);
        }
        content = Some(buffer);
    }

    let Some(bytes) = content else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Missing roster file",
        )));
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::RosterParseFailed,
                "Roster file must be UTF-8 text",
            )));
        }
    };
    // 去掉 BOM
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    Ok(preview_response(text, filename.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_preview_disambiguates_names() {
        let resp = preview_roster(ParseRosterRequest {
            content: "Smith, John\nDoe, John\nWilson, Jane".to_string(),
            filename: None,
        })
        .await
        .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["data"]["display_names"],
            serde_json::json!(["John S.", "John D.", "Jane"])
        );
    }

    #[actix_web::test]
    async fn test_preview_without_names_is_rejected() {
        let resp = preview_roster(ParseRosterRequest {
            content: "[]".to_string(),
            filename: Some("roster.json".to_string()),
        })
        .await
        .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
