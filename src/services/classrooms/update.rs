use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::requests::UpdateClassroomRequest;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{classroom_context_missing, realtime_hub};
use crate::utils::validate::normalize_name;

pub async fn update_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
    body: UpdateClassroomRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(current) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    let name = match body
        .name
        .as_deref()
        .map(|n| normalize_name(n, "Classroom name"))
        .transpose()
    {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ClassroomNameInvalid, msg)));
        }
    };

    match storage
        .update_classroom(&current.id, UpdateClassroomRequest { name })
        .await
    {
        Ok(Some(classroom)) => {
            realtime_hub(request).publish_row(
                ChangeTable::Classrooms,
                ChangeKind::Update,
                Some(&classroom.user_id),
                Some(&classroom.id),
                Some(&classroom),
                Some(&current),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                classroom,
                "Classroom updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
        Err(e) => {
            error!("Failed to update classroom {}: {}", current.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Classroom update failed: {e}"),
            )))
        }
    }
}
