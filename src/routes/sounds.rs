use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::sounds::requests::{
    RenderSoundQuery, UpdateSoundSettingsRequest, ValidateSoundUrlRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::SoundService;

// 懒加载的全局 SoundService 实例
static SOUND_SERVICE: Lazy<SoundService> = Lazy::new(SoundService::new_lazy);

pub async fn get_settings(req: HttpRequest) -> ActixResult<HttpResponse> {
    SOUND_SERVICE.get_settings(&req).await
}

pub async fn update_settings(
    req: HttpRequest,
    body: web::Json<UpdateSoundSettingsRequest>,
) -> ActixResult<HttpResponse> {
    SOUND_SERVICE.update_settings(&req, body.into_inner()).await
}

pub async fn validate_url(body: web::Json<ValidateSoundUrlRequest>) -> ActixResult<HttpResponse> {
    SOUND_SERVICE.validate_url(body.into_inner()).await
}

pub async fn render_effect(
    effect: web::Path<String>,
    query: web::Query<RenderSoundQuery>,
) -> ActixResult<HttpResponse> {
    SOUND_SERVICE
        .render_effect(&effect.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_sound_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sounds")
            // 合成音效是公开的静态资源
            .route("/effects/{effect}", web::get().to(render_effect))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .wrap(middlewares::RequireJWT)
                    .service(
                        web::resource("/settings")
                            .route(web::get().to(get_settings))
                            .route(web::put().to(update_settings)),
                    )
                    .service(
                        web::resource("/validate-url")
                            .wrap(middlewares::RateLimit::url_check())
                            .route(web::post().to(validate_url)),
                    ),
            ),
    );
}
