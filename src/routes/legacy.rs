use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::legacy::requests::LegacyImportRequest;
use crate::models::users::entities::UserRole;
use crate::services::LegacyService;

// 懒加载的全局 LegacyService 实例
static LEGACY_SERVICE: Lazy<LegacyService> = Lazy::new(LegacyService::new_lazy);

pub async fn import_legacy(
    req: HttpRequest,
    body: web::Json<LegacyImportRequest>,
) -> ActixResult<HttpResponse> {
    LEGACY_SERVICE.import_legacy(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_legacy_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/legacy")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/import")
                    .wrap(middlewares::RateLimit::legacy_import())
                    .route(web::post().to(import_legacy)),
            ),
    );
}
