pub mod create;
pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::presets::entities::LayoutPreset;
use crate::models::presets::requests::{CreatePresetRequest, RenamePresetRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct PresetService {
    storage: Option<Arc<dyn Storage>>,
}

impl PresetService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
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

    pub async fn list_presets(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::list_presets(self, request).await
    }

    // 以班级当前座位表保存预设
    pub async fn create_preset(
        &self,
        request: &HttpRequest,
        body: CreatePresetRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_preset(self, request, body).await
    }

    pub async fn rename_preset(
        &self,
        request: &HttpRequest,
        preset_id: String,
        body: RenamePresetRequest,
    ) -> ActixResult<HttpResponse> {
        manage::rename_preset(self, request, preset_id, body).await
    }

    pub async fn delete_preset(
        &self,
        request: &HttpRequest,
        preset_id: String,
    ) -> ActixResult<HttpResponse> {
        manage::delete_preset(self, request, preset_id).await
    }
}

/// 加载当前用户自己的预设
pub(crate) async fn load_own_preset(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    preset_id: &str,
) -> Result<LayoutPreset, HttpResponse> {
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Err(crate::services::unauthorized());
    };
    match storage.get_preset(preset_id).await {
        Ok(Some(preset)) if preset.user_id == uid => Ok(preset),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::PresetNotFound,
            "Preset not found",
        ))),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get preset: {e}"),
            )),
        ),
    }
}
