/*!
 * 实时变更推送
 *
 * 客户端连接 `ws://host/api/v1/realtime?token=<access_token>`，随后发送
 *
 * ```json
 * {"type": "subscribe", "table": "students", "classroom_id": "..."}
 * ```
 *
 * 服务端推送
 *
 * ```json
 * {"type": "change", "table": "students", "event": "UPDATE",
 *  "classroom_id": "...", "new": {...}, "old": {...}, "commit_timestamp": "..."}
 * ```
 *
 * 只推送属于当前用户的行。心跳超时或协议错误时会话结束并注销。
 */

pub mod feed;
pub mod hub;
pub mod session;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::{error, warn};

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::middlewares::require_jwt::authenticate_token;
use crate::models::realtime::requests::RealtimeQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub use feed::spawn_live_totals_feed;
pub use hub::{RealtimeHub, Subscription};

pub struct RealtimeService;

impl RealtimeService {
    pub fn new_lazy() -> Self {
        Self
    }

    fn unauthorized(message: &str) -> HttpResponse {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(ErrorCode::Unauthorized, message))
    }

    fn unavailable() -> HttpResponse {
        HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
            ErrorCode::ServiceUnavailable,
            "Realtime service is not configured",
        ))
    }

    /// 校验 token 后升级为 WebSocket
    pub async fn connect(
        &self,
        request: &HttpRequest,
        stream: web::Payload,
        query: RealtimeQuery,
    ) -> ActixResult<HttpResponse> {
        let token = query.token.or_else(|| {
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::to_string)
        });
        let Some(token) = token else {
            return Ok(Self::unauthorized("Missing access token"));
        };

        let (Some(storage), Some(cache), Some(hub)) = (
            request.app_data::<web::Data<Arc<dyn Storage>>>(),
            request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
            request.app_data::<web::Data<Arc<RealtimeHub>>>(),
        ) else {
            error!("Realtime handshake without storage, cache or hub in app data");
            return Ok(Self::unavailable());
        };

        let user = match authenticate_token(&token, storage.get_ref(), cache.get_ref()).await {
            Ok(user) => user,
            Err(msg) => {
                warn!("Realtime handshake rejected: {}", msg);
                return Ok(Self::unauthorized(&msg));
            }
        };

        let (response, session, messages) = actix_ws::handle(request, stream)?;
        let hub = hub.get_ref().clone();
        let config = AppConfig::get().realtime.clone();
        actix_web::rt::spawn(session::run_session(hub, user.id, config, session, messages));

        Ok(response)
    }
}
