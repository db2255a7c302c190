use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ClassroomService;
use crate::middlewares::RequireJWT;
use crate::models::classrooms::requests::CreateClassroomRequest;
use crate::models::classrooms::responses::ClassroomSummary;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{live_totals, realtime_hub, unauthorized};
use crate::utils::validate::normalize_name;

pub async fn create_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
    body: CreateClassroomRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    let name = match normalize_name(&body.name, "Classroom name") {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ClassroomNameInvalid, msg)));
        }
    };

    match storage.create_classroom(&uid, &name).await {
        Ok(classroom) => {
            info!("Classroom {} created by {}", classroom.id, uid);
            live_totals(request).load_classroom(&classroom, &[]);
            realtime_hub(request).publish_row(
                ChangeTable::Classrooms,
                ChangeKind::Insert,
                Some(&uid),
                Some(&classroom.id),
                Some(&classroom),
                None,
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                ClassroomSummary {
                    classroom,
                    student_count: 0,
                },
                "Classroom created successfully",
            )))
        }
        Err(e) => {
            error!("Failed to create classroom: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ClassroomCreationFailed,
                format!("Classroom creation failed: {e}"),
            )))
        }
    }
}
