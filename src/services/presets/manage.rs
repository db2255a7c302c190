use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{PresetService, load_own_preset};
use crate::middlewares::RequireJWT;
use crate::models::presets::requests::RenamePresetRequest;
use crate::models::presets::responses::PresetListResponse;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{realtime_hub, unauthorized};
use crate::utils::validate::normalize_name;

fn preset_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::PresetNotFound,
        "Preset not found",
    ))
}

pub async fn list_presets(
    service: &PresetService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match storage.list_presets(&uid).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PresetListResponse { items },
            "Presets retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list presets for {}: {}", uid, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list presets: {e}"),
            )))
        }
    }
}

pub async fn rename_preset(
    service: &PresetService,
    request: &HttpRequest,
    preset_id: String,
    body: RenamePresetRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let current = match load_own_preset(&storage, request, &preset_id).await {
        Ok(preset) => preset,
        Err(resp) => return Ok(resp),
    };
    let name = match normalize_name(&body.name, "Preset name") {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::PresetInvalid, msg)));
        }
    };

    match storage.rename_preset(&current.id, &name).await {
        Ok(Some(preset)) => {
            realtime_hub(request).publish_row(
                ChangeTable::LayoutPresets,
                ChangeKind::Update,
                Some(&preset.user_id),
                None,
                Some(&preset),
                Some(&current),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                preset,
                "Preset renamed successfully",
            )))
        }
        Ok(None) => Ok(preset_not_found()),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Preset rename failed: {e}"),
        ))),
    }
}

pub async fn delete_preset(
    service: &PresetService,
    request: &HttpRequest,
    preset_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let preset = match load_own_preset(&storage, request, &preset_id).await {
        Ok(preset) => preset,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_preset(&preset.id).await {
        Ok(true) => {
            realtime_hub(request).publish_row(
                ChangeTable::LayoutPresets,
                ChangeKind::Delete,
                Some(&preset.user_id),
                None,
                None,
                Some(&preset),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Preset deleted successfully")))
        }
        Ok(false) => Ok(preset_not_found()),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Preset deletion failed: {e}"),
        ))),
    }
}
