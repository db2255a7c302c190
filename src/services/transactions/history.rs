use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::error;

use super::TransactionService;
use super::undo::load_undoable;
use crate::config::AppConfig;
use crate::middlewares::RequireClassroomOwner;
use crate::models::transactions::requests::HistoryQuery;
use crate::models::transactions::responses::UndoableResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::classroom_context_missing;

const MAX_PAGE_SIZE: u64 = 200;

/// 分页历史（新到旧），可按学生过滤
pub async fn list_history(
    service: &TransactionService,
    request: &HttpRequest,
    query: HistoryQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    let page = query.page.unwrap_or(1).max(1);
    let size = query
        .size
        .unwrap_or(AppConfig::get().points.history_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    match storage
        .list_transactions(&classroom.id, query.student_id.as_deref(), page, size)
        .await
    {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            history,
            "History retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list history of {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list history: {e}"),
            )))
        }
    }
}

pub async fn get_undoable(
    service: &TransactionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    match load_undoable(&storage, &classroom.id).await {
        Ok(unit) => {
            let now = Utc::now();
            let data = unit.map(|unit| UndoableResponse {
                points: unit.points(),
                expires_in_ms: unit.expires_in_ms(now),
                batch_id: unit.batch_id,
                transactions: unit.transactions,
            });
            Ok(HttpResponse::Ok().json(ApiResponse::success(data, "Undoable write retrieved")))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Failed to load recent transactions: {e}"),
        ))),
    }
}
