use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::realtime::requests::RealtimeQuery;
use crate::services::RealtimeService;

// 懒加载的全局 RealtimeService 实例
static REALTIME_SERVICE: Lazy<RealtimeService> = Lazy::new(RealtimeService::new_lazy);

pub async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<RealtimeQuery>,
) -> ActixResult<HttpResponse> {
    REALTIME_SERVICE
        .connect(&req, stream, query.into_inner())
        .await
}

// 配置路由
// 浏览器 WebSocket 无法设置请求头，token 走查询参数，在握手时自行校验
pub fn configure_realtime_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/realtime", web::get().to(connect));
}
