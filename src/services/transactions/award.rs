//! 积分奖励
//!
//! 在线时直接写入；同步管理器处于离线状态或写入因存储不可达失败时，
//! 写入进入同步队列并返回 202，由后台探测任务恢复后回放。

use std::collections::HashSet;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::TransactionService;
use crate::config::AppConfig;
use crate::middlewares::RequireClassroomOwner;
use crate::models::behaviors::entities::Behavior;
use crate::models::classrooms::entities::Classroom;
use crate::models::transactions::entities::NewTransaction;
use crate::models::transactions::requests::{AwardPointsRequest, BatchAwardRequest};
use crate::models::transactions::responses::{AwardResponse, QueuedAwardResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::{commit_award, current_window, resync_classroom};
use crate::services::sync::{PendingAward, is_connectivity_error};
use crate::services::{classroom_context_missing, live_totals, realtime_hub, sync_manager};
use crate::storage::Storage;

const MAX_NOTE_CHARS: usize = 500;

/// 行为须存在且对班级所有者可见
async fn load_behavior(
    storage: &Arc<dyn Storage>,
    classroom: &Classroom,
    behavior_id: &str,
) -> Result<Behavior, HttpResponse> {
    match storage.get_behavior(behavior_id).await {
        Ok(Some(behavior)) if behavior.visible_to(&classroom.user_id) => Ok(behavior),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BehaviorNotFound,
            "Behavior not found",
        ))),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get behavior: {e}"),
            )),
        ),
    }
}

fn normalize_note(note: Option<String>) -> Result<Option<String>, HttpResponse> {
    let note = note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if note
        .as_deref()
        .is_some_and(|n| n.chars().count() > MAX_NOTE_CHARS)
    {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Note must be at most {MAX_NOTE_CHARS} characters"),
        )));
    }
    Ok(note)
}

fn build_transactions(
    student_ids: &[String],
    behavior: &Behavior,
    note: Option<String>,
    batch_id: Option<String>,
) -> Vec<NewTransaction> {
    let created_at = chrono::Utc::now();
    student_ids
        .iter()
        .map(|student_id| NewTransaction {
            student_id: student_id.clone(),
            behavior_id: Some(behavior.id.clone()),
            behavior_name: behavior.name.clone(),
            behavior_icon: behavior.icon.clone(),
            points: behavior.points,
            note: note.clone(),
            batch_id: batch_id.clone(),
            created_at,
        })
        .collect()
}

fn queue_award(
    request: &HttpRequest,
    classroom: &Classroom,
    transactions: Vec<NewTransaction>,
) -> HttpResponse {
    let sync = sync_manager(request);
    let award = PendingAward::new(&classroom.user_id, &classroom.id, transactions);
    let queue_id = award.id.clone();
    match sync.enqueue(award) {
        Ok(pending) => {
            info!(
                "Award for classroom {} queued while offline ({} pending)",
                classroom.id, pending
            );
            HttpResponse::Accepted().json(ApiResponse::error(
                ErrorCode::AwardQueued,
                QueuedAwardResponse { queue_id, pending },
                "Storage unavailable, award queued for sync",
            ))
        }
        Err(e) => {
            warn!("Award for classroom {} rejected: {}", classroom.id, e);
            HttpResponse::ServiceUnavailable()
                .json(ApiResponse::error_empty(ErrorCode::ServiceUnavailable, e.to_string()))
        }
    }
}

async fn submit(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    classroom: &Classroom,
    transactions: Vec<NewTransaction>,
) -> HttpResponse {
    if !sync_manager(request).is_online() {
        return queue_award(request, classroom, transactions);
    }

    let live = live_totals(request);
    let hub = realtime_hub(request);
    let window = current_window();
    if !live.is_loaded(&classroom.id)
        && let Err(e) = resync_classroom(storage, &live, &classroom.id, window).await
    {
        warn!("Could not load live totals for {}: {}", classroom.id, e);
    }

    let result = commit_award(
        storage,
        &live,
        &hub,
        &classroom.user_id,
        &classroom.id,
        transactions.clone(),
        window,
    )
    .await;

    match result {
        Ok(outcome) => {
            let classroom_totals = live
                .classroom_totals(&classroom.id)
                .unwrap_or_else(|| outcome.classroom.stored_totals());
            HttpResponse::Created().json(ApiResponse::success(
                AwardResponse {
                    transactions: outcome.transactions,
                    students: outcome.students,
                    classroom_totals,
                },
                "Points awarded successfully",
            ))
        }
        Err(e) if is_connectivity_error(&e) => {
            sync_manager(request).set_online(false);
            queue_award(request, classroom, transactions)
        }
        Err(e) => {
            error!("Award failed for classroom {}: {}", classroom.id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::AwardFailed,
                format!("Failed to award points: {e}"),
            ))
        }
    }
}

pub async fn award_points(
    service: &TransactionService,
    request: &HttpRequest,
    body: AwardPointsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let note = match normalize_note(body.note) {
        Ok(note) => note,
        Err(resp) => return Ok(resp),
    };
    let behavior = match load_behavior(&storage, &classroom, &body.behavior_id).await {
        Ok(behavior) => behavior,
        Err(resp) => return Ok(resp),
    };

    match storage.get_student(&body.student_id, current_window()).await {
        Ok(Some(student)) if student.classroom_id == classroom.id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) if is_connectivity_error(&e) => {
            let transactions =
                build_transactions(&[body.student_id.clone()], &behavior, note, None);
            sync_manager(request).set_online(false);
            return Ok(queue_award(request, &classroom, transactions));
        }
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to get student: {e}"),
            )));
        }
    }

    let transactions = build_transactions(&[body.student_id], &behavior, note, None);
    Ok(submit(&storage, request, &classroom, transactions).await)
}

/// 批量奖励；student_ids 为空时奖励全班，全部流水共用一个 batch_id
pub async fn batch_award_points(
    service: &TransactionService,
    request: &HttpRequest,
    body: BatchAwardRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let note = match normalize_note(body.note) {
        Ok(note) => note,
        Err(resp) => return Ok(resp),
    };
    let behavior = match load_behavior(&storage, &classroom, &body.behavior_id).await {
        Ok(behavior) => behavior,
        Err(resp) => return Ok(resp),
    };

    let roster: Vec<String> = match storage.list_students(&classroom.id, current_window()).await {
        Ok(students) => students.into_iter().map(|s| s.id).collect(),
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list students: {e}"),
            )));
        }
    };

    let student_ids: Vec<String> = if body.student_ids.is_empty() {
        roster
    } else {
        let members: HashSet<&str> = roster.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(body.student_ids.len());
        for id in body.student_ids {
            if !members.contains(id.as_str()) {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::StudentNotFound,
                    format!("Student {id} not found in classroom"),
                )));
            }
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        ids
    };

    if student_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Classroom has no students to award",
        )));
    }
    let max_batch = AppConfig::get().points.max_batch_size;
    if student_ids.len() > max_batch {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("At most {max_batch} students can be awarded at once"),
        )));
    }

    let batch_id = uuid::Uuid::new_v4().to_string();
    let transactions = build_transactions(&student_ids, &behavior, note, Some(batch_id));
    Ok(submit(&storage, request, &classroom, transactions).await)
}
