//! 清空与重算班级积分
//!
//! 两者都直接改写汇总列，完成后从存储重新加载实时视图并推送新行。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::entities::Classroom;
use crate::models::classrooms::responses::ResetPointsResponse;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::{current_window, resync_classroom};
use crate::services::{RealtimeHub, classroom_context_missing, live_totals, realtime_hub};
use crate::storage::Storage;

/// 重新加载班级及学生并推送整行更新
async fn reload_and_publish(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    hub: &RealtimeHub,
    before: &Classroom,
    students_before: &[Student],
) -> Option<Classroom> {
    let window = current_window();
    let live = live_totals(request);
    live.mark_stale(&before.id);
    if let Err(e) = resync_classroom(storage, &live, &before.id, window).await {
        warn!("Resync after rewrite failed for {}: {}", before.id, e);
    }

    let students = storage
        .list_students(&before.id, window)
        .await
        .unwrap_or_default();
    for student in &students {
        let old = students_before.iter().find(|s| s.id == student.id);
        hub.publish_row(
            ChangeTable::Students,
            ChangeKind::Update,
            Some(&before.user_id),
            Some(&before.id),
            Some(student),
            old,
        );
    }

    let classroom = storage.get_classroom(&before.id).await.ok().flatten()?;
    hub.publish_row(
        ChangeTable::Classrooms,
        ChangeKind::Update,
        Some(&before.user_id),
        Some(&before.id),
        Some(&classroom),
        Some(before),
    );
    Some(classroom)
}

pub async fn reset_points(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let students_before = storage
        .list_students(&classroom.id, current_window())
        .await
        .unwrap_or_default();

    match storage.reset_classroom_points(&classroom.id).await {
        Ok(deleted_transactions) => {
            info!(
                "Classroom {} reset, {} transactions removed",
                classroom.id, deleted_transactions
            );
            let hub = realtime_hub(request);
            reload_and_publish(&storage, request, &hub, &classroom, &students_before).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ResetPointsResponse {
                    deleted_transactions,
                },
                "Classroom points reset successfully",
            )))
        }
        Err(e) => {
            error!("Failed to reset classroom {}: {}", classroom.id, e);
            live_totals(request).mark_stale(&classroom.id);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to reset points: {e}"),
            )))
        }
    }
}

pub async fn recompute_totals(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let students_before = storage
        .list_students(&classroom.id, current_window())
        .await
        .unwrap_or_default();

    match storage.recompute_classroom_totals(&classroom.id).await {
        Ok(Some(_)) => {
            let hub = realtime_hub(request);
            let refreshed =
                reload_and_publish(&storage, request, &hub, &classroom, &students_before).await;
            match refreshed {
                Some(refreshed) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                    refreshed,
                    "Classroom totals recomputed successfully",
                ))),
                None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomNotFound,
                    "Classroom not found",
                ))),
            }
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
        Err(e) => {
            error!("Failed to recompute classroom {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to recompute totals: {e}"),
            )))
        }
    }
}
