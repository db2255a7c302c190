use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::middlewares::RequireJWT;
use crate::models::classrooms::responses::ClassroomListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::unauthorized;

pub async fn list_classrooms(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match storage.list_classrooms(&uid).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassroomListResponse { items },
            "Classrooms retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list classrooms for {}: {}", uid, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list classrooms: {e}"),
            )))
        }
    }
}
