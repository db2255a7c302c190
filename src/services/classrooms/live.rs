use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::responses::LiveTotalsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::{current_window, resync_classroom};
use crate::services::{classroom_context_missing, live_totals};

/// 读取实时汇总；未加载或已过期时先从存储同步
pub async fn get_live_totals(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let live = live_totals(request);

    let resynced = !live.is_loaded(&classroom.id) || live.needs_resync(&classroom.id);
    if resynced
        && let Err(e) = resync_classroom(&storage, &live, &classroom.id, current_window()).await
    {
        error!("Failed to resync classroom {}: {}", classroom.id, e);
        return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Failed to load live totals: {e}"),
        )));
    }

    match live.snapshot(&classroom.id) {
        Some((totals, students)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LiveTotalsResponse {
                classroom_id: classroom.id,
                classroom: totals,
                students,
                resynced,
            },
            "Live totals retrieved successfully",
        ))),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
    }
}
