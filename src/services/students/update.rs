use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::StudentService;
use super::get::load_student_in_classroom;
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::students::requests::UpdateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::current_window;
use crate::services::{classroom_context_missing, realtime_hub};
use crate::utils::validate::{normalize_name, validate_avatar_color};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: String,
    body: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let current = match load_student_in_classroom(&storage, &classroom.id, &student_id).await {
        Ok(student) => student,
        Err(resp) => return Ok(resp),
    };

    let name = match body
        .name
        .as_deref()
        .map(|n| normalize_name(n, "Student name"))
        .transpose()
    {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::StudentNameInvalid, msg)));
        }
    };
    // 空字符串表示清除头像颜色
    if let Some(color) = body.avatar_color.as_deref()
        && let Err(msg) = validate_avatar_color(color)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let update = UpdateStudentRequest {
        name,
        avatar_color: body.avatar_color,
    };
    match storage
        .update_student(&current.id, update, current_window())
        .await
    {
        Ok(Some(student)) => {
            realtime_hub(request).publish_row(
                ChangeTable::Students,
                ChangeKind::Update,
                Some(&classroom.user_id),
                Some(&classroom.id),
                Some(&student),
                Some(&current),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => {
            error!("Failed to update student {}: {}", current.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Student update failed: {e}"),
            )))
        }
    }
}
