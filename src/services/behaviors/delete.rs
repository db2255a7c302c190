use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{BehaviorService, load_modifiable};
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::realtime_hub;

/// 删除行为；已有流水保留名称与图标快照
pub async fn delete_behavior(
    service: &BehaviorService,
    request: &HttpRequest,
    behavior_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (user, behavior) = match load_modifiable(&storage, request, &behavior_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_behavior(&behavior.id).await {
        Ok(true) => {
            info!("Behavior {} deleted by {}", behavior.id, user.id);
            realtime_hub(request).publish_row(
                ChangeTable::Behaviors,
                ChangeKind::Delete,
                behavior.user_id.as_deref(),
                None,
                None,
                Some(&behavior),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Behavior deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BehaviorNotFound,
            "Behavior not found",
        ))),
        Err(e) => {
            error!("Failed to delete behavior {}: {}", behavior.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Behavior deletion failed: {e}"),
            )))
        }
    }
}
