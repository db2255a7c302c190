use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::StudentService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::students::entities::Student;
use crate::models::students::requests::{BulkCreateStudentsRequest, CreateStudentRequest};
use crate::models::students::responses::BulkCreateStudentsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::{current_window, resync_classroom};
use crate::services::{classroom_context_missing, live_totals, realtime_hub};
use crate::utils::validate::{normalize_name, validate_avatar_color};

fn publish_inserts(request: &HttpRequest, owner_id: &str, students: &[Student]) {
    let hub = realtime_hub(request);
    for student in students {
        hub.publish_row(
            ChangeTable::Students,
            ChangeKind::Insert,
            Some(owner_id),
            Some(&student.classroom_id),
            Some(student),
            None,
        );
    }
}

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    body: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    let name = match normalize_name(&body.name, "Student name") {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::StudentNameInvalid, msg)));
        }
    };
    let avatar_color = body.avatar_color.filter(|c| !c.is_empty());
    if let Some(color) = avatar_color.as_deref()
        && let Err(msg) = validate_avatar_color(color)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    match storage
        .create_student(&classroom.id, CreateStudentRequest { name, avatar_color })
        .await
    {
        Ok(student) => {
            let live = live_totals(request);
            if live.is_loaded(&classroom.id) {
                let _ = resync_classroom(&storage, &live, &classroom.id, current_window()).await;
            }
            publish_inserts(request, &classroom.user_id, std::slice::from_ref(&student));
            Ok(HttpResponse::Created().json(ApiResponse::success(
                student,
                "Student created successfully",
            )))
        }
        Err(e) => {
            error!("Failed to create student in {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Student creation failed: {e}"),
            )))
        }
    }
}

/// 逐个校验姓名，合法的一次性写入；非法的记入 errors
pub async fn bulk_create_students(
    service: &StudentService,
    request: &HttpRequest,
    body: BulkCreateStudentsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    let mut names = Vec::with_capacity(body.names.len());
    let mut errors = Vec::new();
    for (index, raw) in body.names.iter().enumerate() {
        match normalize_name(raw, "Student name") {
            Ok(name) => names.push(name),
            Err(msg) => errors.push(format!("Row {}: {}", index + 1, msg)),
        }
    }

    if names.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::StudentNameInvalid,
            BulkCreateStudentsResponse {
                created: Vec::new(),
                errors,
            },
            "No valid student names",
        )));
    }

    match storage.create_students(&classroom.id, names).await {
        Ok(created) => {
            info!("{} students added to {}", created.len(), classroom.id);
            let live = live_totals(request);
            if live.is_loaded(&classroom.id) {
                let _ = resync_classroom(&storage, &live, &classroom.id, current_window()).await;
            }
            publish_inserts(request, &classroom.user_id, &created);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                BulkCreateStudentsResponse { created, errors },
                "Students created successfully",
            )))
        }
        Err(e) => {
            error!("Bulk student creation failed for {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Student creation failed: {e}"),
            )))
        }
    }
}
