use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::ApiResponse;
use crate::services::classroom_context_missing;

pub async fn get_classroom(
    _service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match RequireClassroomOwner::extract_classroom(request) {
        Some(classroom) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            classroom,
            "Classroom retrieved successfully",
        ))),
        None => Ok(classroom_context_missing()),
    }
}
