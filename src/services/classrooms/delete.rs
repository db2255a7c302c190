use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{classroom_context_missing, live_totals, realtime_hub};

pub async fn delete_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    match storage.delete_classroom(&classroom.id).await {
        Ok(true) => {
            info!("Classroom {} deleted", classroom.id);
            live_totals(request).evict(&classroom.id);
            realtime_hub(request).publish_row(
                ChangeTable::Classrooms,
                ChangeKind::Delete,
                Some(&classroom.user_id),
                Some(&classroom.id),
                None,
                Some(&classroom),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Classroom deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
        Err(e) => {
            error!("Failed to delete classroom {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Classroom deletion failed: {e}"),
            )))
        }
    }
}
