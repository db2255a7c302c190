use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SeatingService, current_seat_of, load_chart, publish, storage_failure};
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::seating::entities::SeatingSeat;
use crate::models::seating::requests::AssignSeatRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::current_window;
use crate::services::{classroom_context_missing, realtime_hub};

fn seat_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SeatNotFound, "Seat not found"))
}

/// 学生入座；其原座位会先被清空
pub async fn assign_seat(
    service: &SeatingService,
    request: &HttpRequest,
    seat_id: String,
    body: AssignSeatRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    if chart.find_seat(&seat_id).is_none() {
        return Ok(seat_not_found());
    }

    match storage.get_student(&body.student_id, current_window()).await {
        Ok(Some(student)) if student.classroom_id == classroom.id => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => return Ok(storage_failure("get student", e)),
    }

    // 已在该座位上，无需改动
    if current_seat_of(&chart, &body.student_id) == Some(seat_id.as_str()) {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            Vec::<SeatingSeat>::new(),
            "Student already in this seat",
        )));
    }

    match storage.assign_seat(&seat_id, &body.student_id).await {
        Ok(changed) => {
            let hub = realtime_hub(request);
            for seat in &changed {
                let old = chart.find_seat(&seat.id);
                publish(
                    &hub,
                    &classroom,
                    ChangeTable::SeatingSeats,
                    ChangeKind::Update,
                    Some(seat),
                    old,
                );
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                changed,
                "Student seated successfully",
            )))
        }
        Err(e) => Ok(storage_failure("assign seat", e)),
    }
}

pub async fn unassign_seat(
    service: &SeatingService,
    request: &HttpRequest,
    seat_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let Some(previous) = chart.find_seat(&seat_id).cloned() else {
        return Ok(seat_not_found());
    };

    match storage.unassign_seat(&seat_id).await {
        Ok(Some(seat)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingSeats,
                ChangeKind::Update,
                Some(&seat),
                Some(&previous),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(seat, "Seat cleared successfully")))
        }
        Ok(None) => Ok(seat_not_found()),
        Err(e) => Ok(storage_failure("clear seat", e)),
    }
}
