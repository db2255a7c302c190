use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::{info, warn};

use super::SystemService;
use crate::models::system::requests::SetOnlineRequest;
use crate::models::system::responses::SystemStatusResponse;
use crate::models::{AppStartTime, ApiResponse};
use crate::services::sync::replay_pending;
use crate::services::{live_totals, realtime_hub, sync_manager};

pub async fn get_status(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let sync = sync_manager(request);

    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or_else(chrono::Utc::now);
    let uptime_secs = chrono::Utc::now()
        .signed_duration_since(started_at)
        .num_seconds();

    let response = SystemStatusResponse {
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        started_at,
        uptime_secs,
        sync_status: sync.status(),
        pending_writes: sync.pending(),
        realtime: realtime_hub(request).stats(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Status retrieved successfully",
    )))
}

/// 手动切换在线状态；恢复在线时立即回放队列
pub async fn set_online(
    service: &SystemService,
    request: &HttpRequest,
    body: SetOnlineRequest,
) -> ActixResult<HttpResponse> {
    let sync = sync_manager(request);
    sync.set_online(body.online);
    warn!("Sync status manually set to online={}", body.online);

    if body.online && sync.pending() > 0 {
        let storage = service.get_storage(request);
        let live = live_totals(request);
        let hub = realtime_hub(request);
        let sync = sync.clone();
        actix_web::rt::spawn(async move {
            let replayed = replay_pending(&sync, &storage, &live, &hub).await;
            info!("Replayed {} queued awards after manual reconnect", replayed);
        });
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        serde_json::json!({
            "sync_status": sync.status(),
            "pending_writes": sync.pending(),
        }),
        "Sync status updated",
    )))
}
