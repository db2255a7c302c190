//! 撤销
//!
//! 只允许在撤销窗口内撤销；批次总是整体撤销。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::{error, info};

use super::{TransactionService, undo_window};
use crate::errors::ClassPointsError;
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::entities::Classroom;
use crate::models::transactions::entities::PointTransaction;
use crate::models::transactions::responses::UndoResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::{commit_undo, current_window, find_undoable};
use crate::services::{classroom_context_missing, live_totals, realtime_hub, sync_manager};
use crate::storage::Storage;

fn offline() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
        ErrorCode::ServiceUnavailable,
        "Storage unavailable, undo is not possible while offline",
    ))
}

fn expired() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::UndoWindowExpired,
        "Undo window has expired",
    ))
}

fn within_window(transactions: &[PointTransaction]) -> bool {
    let now = Utc::now();
    transactions
        .iter()
        .map(|tx| tx.created_at)
        .max()
        .is_some_and(|latest| now - latest <= undo_window())
}

async fn perform_undo(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    classroom: &Classroom,
    transactions: Vec<PointTransaction>,
    batch_id: Option<String>,
) -> HttpResponse {
    let live = live_totals(request);
    let hub = realtime_hub(request);
    let result = commit_undo(
        storage,
        &live,
        &hub,
        &classroom.user_id,
        &classroom.id,
        &transactions,
        current_window(),
    )
    .await;

    match result {
        Ok(outcome) => {
            info!(
                "Undid {} transactions in classroom {}",
                outcome.transactions.len(),
                classroom.id
            );
            let classroom_totals = live
                .classroom_totals(&classroom.id)
                .unwrap_or_else(|| outcome.classroom.stored_totals());
            HttpResponse::Ok().json(ApiResponse::success(
                UndoResponse {
                    undone: outcome.transactions,
                    batch_id,
                    classroom_totals,
                },
                "Undo successful",
            ))
        }
        Err(ClassPointsError::NotFound(msg)) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::TransactionNotFound, msg)),
        Err(e) => {
            error!("Undo failed for classroom {}: {}", classroom.id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Undo failed: {e}"),
            ))
        }
    }
}

/// 窗口期内最近一次写入（单条或整批）
pub(crate) async fn load_undoable(
    storage: &Arc<dyn Storage>,
    classroom_id: &str,
) -> crate::errors::Result<Option<crate::services::points::UndoUnit>> {
    let now = Utc::now();
    let window = undo_window();
    let since_ms = (now - window).timestamp_millis();
    let recent = storage.list_transactions_since(classroom_id, since_ms).await?;
    Ok(find_undoable(&recent, now, window))
}

pub async fn undo_latest(
    service: &TransactionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    if !sync_manager(request).is_online() {
        return Ok(offline());
    }

    match load_undoable(&storage, &classroom.id).await {
        Ok(Some(unit)) => {
            Ok(perform_undo(&storage, request, &classroom, unit.transactions, unit.batch_id).await)
        }
        Ok(None) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::NothingToUndo,
            "Nothing to undo",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Failed to load recent transactions: {e}"),
        ))),
    }
}

pub async fn undo_transaction(
    service: &TransactionService,
    request: &HttpRequest,
    transaction_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    if !sync_manager(request).is_online() {
        return Ok(offline());
    }

    let transaction = match storage.get_transaction(&transaction_id).await {
        Ok(Some(tx)) if tx.classroom_id == classroom.id => tx,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            )));
        }
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get transaction: {e}"),
            )));
        }
    };

    let transactions = vec![transaction];
    if !within_window(&transactions) {
        return Ok(expired());
    }
    Ok(perform_undo(&storage, request, &classroom, transactions, None).await)
}

pub async fn undo_batch(
    service: &TransactionService,
    request: &HttpRequest,
    batch_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    if !sync_manager(request).is_online() {
        return Ok(offline());
    }

    let transactions: Vec<PointTransaction> =
        match storage.list_batch_transactions(&batch_id).await {
            Ok(txs) => txs
                .into_iter()
                .filter(|tx| tx.classroom_id == classroom.id)
                .collect(),
            Err(e) => {
                return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load batch: {e}"),
                )));
            }
        };

    if transactions.is_empty() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TransactionNotFound,
            "Batch not found",
        )));
    }
    if !within_window(&transactions) {
        return Ok(expired());
    }
    Ok(perform_undo(&storage, request, &classroom, transactions, Some(batch_id)).await)
}
