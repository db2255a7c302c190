use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::BehaviorService;
use crate::middlewares::RequireJWT;
use crate::models::behaviors::entities::{Behavior, BehaviorCategory};
use crate::models::behaviors::responses::BehaviorListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::unauthorized;

pub fn split_by_category(behaviors: Vec<Behavior>) -> BehaviorListResponse {
    let (positive, negative) = behaviors
        .into_iter()
        .partition(|b| b.category == BehaviorCategory::Positive);
    BehaviorListResponse { positive, negative }
}

pub async fn list_behaviors(
    service: &BehaviorService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match storage.list_behaviors(&uid).await {
        Ok(behaviors) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            split_by_category(behaviors),
            "Behaviors retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list behaviors for {}: {}", uid, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list behaviors: {e}"),
            )))
        }
    }
}
