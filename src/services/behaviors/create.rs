use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::BehaviorService;
use crate::middlewares::RequireJWT;
use crate::models::behaviors::requests::CreateBehaviorRequest;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{realtime_hub, unauthorized};
use crate::utils::validate::{normalize_name, validate_behavior_points};

pub async fn create_behavior(
    service: &BehaviorService,
    request: &HttpRequest,
    body: CreateBehaviorRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    let name = match normalize_name(&body.name, "Behavior name") {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BehaviorInvalid, msg)));
        }
    };
    let category = match validate_behavior_points(body.points, body.category) {
        Ok(category) => category,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BehaviorInvalid, msg)));
        }
    };
    let icon = body.icon.trim().to_string();
    if icon.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BehaviorInvalid,
            "Behavior icon must not be empty",
        )));
    }

    let request_body = CreateBehaviorRequest {
        name,
        points: body.points,
        icon,
        category: Some(category),
    };
    match storage.create_behavior(&uid, request_body).await {
        Ok(behavior) => {
            info!("Custom behavior {} created by {}", behavior.id, uid);
            realtime_hub(request).publish_row(
                ChangeTable::Behaviors,
                ChangeKind::Insert,
                Some(&uid),
                None,
                Some(&behavior),
                None,
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                behavior,
                "Behavior created successfully",
            )))
        }
        Err(e) => {
            error!("Failed to create behavior: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Behavior creation failed: {e}"),
            )))
        }
    }
}
