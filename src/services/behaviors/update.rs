use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{BehaviorService, load_modifiable};
use crate::models::behaviors::requests::UpdateBehaviorRequest;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::realtime_hub;
use crate::utils::validate::{normalize_name, validate_behavior_points};

pub async fn update_behavior(
    service: &BehaviorService,
    request: &HttpRequest,
    behavior_id: String,
    body: UpdateBehaviorRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (_, current) = match load_modifiable(&storage, request, &behavior_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    let name = match body
        .name
        .as_deref()
        .map(|n| normalize_name(n, "Behavior name"))
        .transpose()
    {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BehaviorInvalid, msg)));
        }
    };

    // 分值与类别按合并后的结果校验
    let points = body.points.unwrap_or(current.points);
    let category_hint = body.category.or(body.points.is_none().then_some(current.category));
    let category = match validate_behavior_points(points, category_hint) {
        Ok(category) => category,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BehaviorInvalid, msg)));
        }
    };
    let icon = body.icon.map(|i| i.trim().to_string());
    if icon.as_deref().is_some_and(str::is_empty) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BehaviorInvalid,
            "Behavior icon must not be empty",
        )));
    }

    let update = UpdateBehaviorRequest {
        name,
        points: body.points,
        icon,
        category: Some(category),
    };
    match storage.update_behavior(&current.id, update).await {
        Ok(Some(behavior)) => {
            realtime_hub(request).publish_row(
                ChangeTable::Behaviors,
                ChangeKind::Update,
                behavior.user_id.as_deref(),
                None,
                Some(&behavior),
                Some(&current),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                behavior,
                "Behavior updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BehaviorNotFound,
            "Behavior not found",
        ))),
        Err(e) => {
            error!("Failed to update behavior {}: {}", current.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Behavior update failed: {e}"),
            )))
        }
    }
}
