use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::presets::requests::{CreatePresetRequest, RenamePresetRequest};
use crate::models::users::entities::UserRole;
use crate::services::PresetService;
use crate::utils::SafePresetId;

// 懒加载的全局 PresetService 实例
static PRESET_SERVICE: Lazy<PresetService> = Lazy::new(PresetService::new_lazy);

pub async fn list_presets(req: HttpRequest) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.list_presets(&req).await
}

pub async fn create_preset(
    req: HttpRequest,
    body: web::Json<CreatePresetRequest>,
) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.create_preset(&req, body.into_inner()).await
}

pub async fn rename_preset(
    req: HttpRequest,
    preset_id: SafePresetId,
    body: web::Json<RenamePresetRequest>,
) -> ActixResult<HttpResponse> {
    PRESET_SERVICE
        .rename_preset(&req, preset_id.0, body.into_inner())
        .await
}

pub async fn delete_preset(req: HttpRequest, preset_id: SafePresetId) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.delete_preset(&req, preset_id.0).await
}

// 配置路由
pub fn configure_preset_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/layout-presets")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_presets))
                    .route(web::post().to(create_preset)),
            )
            .service(
                web::resource("/{preset_id}")
                    .route(web::put().to(rename_preset))
                    .route(web::delete().to(delete_preset)),
            ),
    );
}
