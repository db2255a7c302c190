use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::PresetService;
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::presets::requests::CreatePresetRequest;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::seating::capture_layout;
use crate::services::{realtime_hub, unauthorized};
use crate::utils::validate::normalize_name;

pub async fn create_preset(
    service: &PresetService,
    request: &HttpRequest,
    body: CreatePresetRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let name = match normalize_name(&body.name, "Preset name") {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::PresetInvalid, msg)));
        }
    };

    let classroom = match storage.get_classroom(&body.classroom_id).await {
        Ok(Some(classroom)) if classroom.user_id == user.id || user.is_admin() => classroom,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassroomNotFound,
                "Classroom not found",
            )));
        }
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get classroom: {e}"),
            )));
        }
    };

    let chart = match storage
        .get_or_create_chart(&classroom.id, &AppConfig::get().seating)
        .await
    {
        Ok(chart) => chart,
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load seating chart: {e}"),
            )));
        }
    };
    let layout = capture_layout(&chart);

    match storage.create_preset(&user.id, &name, &layout).await {
        Ok(preset) => {
            info!("Preset {} saved from classroom {}", preset.id, classroom.id);
            realtime_hub(request).publish_row(
                ChangeTable::LayoutPresets,
                ChangeKind::Insert,
                Some(&user.id),
                None,
                Some(&preset),
                None,
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                preset,
                "Preset created successfully",
            )))
        }
        Err(e) => {
            error!("Failed to create preset: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Preset creation failed: {e}"),
            )))
        }
    }
}
