use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::classroom_context_missing;
use crate::services::points::current_window;
use crate::storage::Storage;

/// 加载学生并确认其属于路径中的班级
pub(crate) async fn load_student_in_classroom(
    storage: &Arc<dyn Storage>,
    classroom_id: &str,
    student_id: &str,
) -> Result<Student, HttpResponse> {
    match storage.get_student(student_id, current_window()).await {
        Ok(Some(student)) if student.classroom_id == classroom_id => Ok(student),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get student: {e}"),
            )),
        ),
    }
}

pub async fn get_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    match load_student_in_classroom(&storage, &classroom.id, &student_id).await {
        Ok(student) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            student,
            "Student retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
