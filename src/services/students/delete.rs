use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::StudentService;
use super::get::load_student_in_classroom;
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{classroom_context_missing, live_totals, realtime_hub};

/// 删除学生；其积分从班级汇总中扣除
pub async fn delete_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let student = match load_student_in_classroom(&storage, &classroom.id, &student_id).await {
        Ok(student) => student,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_student(&student.id).await {
        Ok(Some(updated)) => {
            info!("Student {} removed from {}", student.id, classroom.id);
            live_totals(request).remove_student(&student.id);
            let hub = realtime_hub(request);
            hub.publish_row(
                ChangeTable::Students,
                ChangeKind::Delete,
                Some(&classroom.user_id),
                Some(&classroom.id),
                None,
                Some(&student),
            );
            hub.publish_row(
                ChangeTable::Classrooms,
                ChangeKind::Update,
                Some(&classroom.user_id),
                Some(&classroom.id),
                Some(&updated),
                Some(&classroom),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => {
            error!("Failed to delete student {}: {}", student.id, e);
            live_totals(request).mark_stale(&classroom.id);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Student deletion failed: {e}"),
            )))
        }
    }
}
