use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::behaviors::requests::{CreateBehaviorRequest, UpdateBehaviorRequest};
use crate::models::users::entities::UserRole;
use crate::services::BehaviorService;
use crate::utils::SafeBehaviorId;

// 懒加载的全局 BehaviorService 实例
static BEHAVIOR_SERVICE: Lazy<BehaviorService> = Lazy::new(BehaviorService::new_lazy);

pub async fn list_behaviors(req: HttpRequest) -> ActixResult<HttpResponse> {
    BEHAVIOR_SERVICE.list_behaviors(&req).await
}

pub async fn create_behavior(
    req: HttpRequest,
    body: web::Json<CreateBehaviorRequest>,
) -> ActixResult<HttpResponse> {
    BEHAVIOR_SERVICE
        .create_behavior(&req, body.into_inner())
        .await
}

pub async fn update_behavior(
    req: HttpRequest,
    behavior_id: SafeBehaviorId,
    body: web::Json<UpdateBehaviorRequest>,
) -> ActixResult<HttpResponse> {
    BEHAVIOR_SERVICE
        .update_behavior(&req, behavior_id.0, body.into_inner())
        .await
}

pub async fn delete_behavior(
    req: HttpRequest,
    behavior_id: SafeBehaviorId,
) -> ActixResult<HttpResponse> {
    BEHAVIOR_SERVICE.delete_behavior(&req, behavior_id.0).await
}

// 配置路由
pub fn configure_behavior_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/behaviors")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                // 全局行为 + 当前教师的自定义行为
                web::resource("")
                    .route(web::get().to(list_behaviors))
                    .route(web::post().to(create_behavior)),
            )
            .service(
                // 教师只能修改自己的行为，全局行为仅管理员可改
                web::resource("/{behavior_id}")
                    .route(web::put().to(update_behavior))
                    .route(web::delete().to(delete_behavior)),
            ),
    );
}
