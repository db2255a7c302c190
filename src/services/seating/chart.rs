use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::assignment::plan_random_seating;
use super::{SeatingService, invalid, load_chart, publish, storage_failure};
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::seating::requests::{ApplyPresetRequest, UpdateChartRequest};
use crate::models::seating::responses::RandomizeResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::points::current_window;
use crate::services::{classroom_context_missing, realtime_hub};

const MIN_CANVAS: f64 = 200.0;
const MAX_CANVAS: f64 = 10_000.0;
const MIN_GRID: f64 = 5.0;
const MAX_GRID: f64 = 200.0;

/// 画布尺寸与网格大小的取值范围
pub fn validate_chart_update(body: &UpdateChartRequest) -> Result<(), String> {
    for (field, value) in [
        ("canvas_width", body.canvas_width),
        ("canvas_height", body.canvas_height),
    ] {
        if let Some(v) = value
            && !(v.is_finite() && (MIN_CANVAS..=MAX_CANVAS).contains(&v))
        {
            return Err(format!(
                "{field} must be between {MIN_CANVAS} and {MAX_CANVAS}"
            ));
        }
    }
    if let Some(grid) = body.grid_size
        && !(grid.is_finite() && (MIN_GRID..=MAX_GRID).contains(&grid))
    {
        return Err(format!("grid_size must be between {MIN_GRID} and {MAX_GRID}"));
    }
    Ok(())
}

pub async fn get_chart(
    service: &SeatingService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    match load_chart(&storage, &classroom).await {
        Ok(chart) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            chart,
            "Seating chart retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}

pub async fn update_chart(
    service: &SeatingService,
    request: &HttpRequest,
    body: UpdateChartRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    if let Err(msg) = validate_chart_update(&body) {
        return Ok(invalid(msg));
    }
    let current = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };

    match storage
        .update_chart(
            &current.id,
            body.canvas_width,
            body.canvas_height,
            body.grid_size,
            body.snap_enabled,
        )
        .await
    {
        Ok(Some(chart)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingCharts,
                ChangeKind::Update,
                Some(&chart),
                Some(&current),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                chart,
                "Seating chart updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SeatingChartNotFound,
            "Seating chart not found",
        ))),
        Err(e) => Ok(storage_failure("update seating chart", e)),
    }
}

/// 打乱学生后按 (组字母, 座位位置) 依次入座
pub async fn randomize(
    service: &SeatingService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let student_ids: Vec<String> =
        match storage.list_students(&classroom.id, current_window()).await {
            Ok(students) => students.into_iter().map(|s| s.id).collect(),
            Err(e) => return Ok(storage_failure("list students", e)),
        };

    let plan = plan_random_seating(&chart, &student_ids, &mut rand::rng());
    if let Err(e) = storage.apply_seat_plan(&chart.id, plan.assignments).await {
        return Ok(storage_failure("apply seating plan", e));
    }
    info!(
        "Randomized seating for {}: {} unseated",
        classroom.id,
        plan.unseated.len()
    );

    match storage.get_chart_by_id(&chart.id).await {
        Ok(Some(updated)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingCharts,
                ChangeKind::Update,
                Some(&updated),
                Some(&chart),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RandomizeResponse {
                    chart: updated,
                    unseated_student_ids: plan.unseated,
                },
                "Seats randomized successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SeatingChartNotFound,
            "Seating chart not found",
        ))),
        Err(e) => Ok(storage_failure("reload seating chart", e)),
    }
}

pub async fn apply_preset(
    service: &SeatingService,
    request: &HttpRequest,
    body: ApplyPresetRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    let preset = match storage.get_preset(&body.preset_id).await {
        Ok(Some(preset)) if preset.user_id == classroom.user_id => preset,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::PresetNotFound,
                "Preset not found",
            )));
        }
        Err(e) => return Ok(storage_failure("load preset", e)),
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };

    if let Err(e) = storage.replace_layout(&chart.id, &preset.layout).await {
        return Ok(storage_failure("apply preset", e));
    }
    info!("Preset {} applied to classroom {}", preset.id, classroom.id);

    match storage.get_chart_by_id(&chart.id).await {
        Ok(Some(updated)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingCharts,
                ChangeKind::Update,
                Some(&updated),
                Some(&chart),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                updated,
                "Preset applied successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SeatingChartNotFound,
            "Seating chart not found",
        ))),
        Err(e) => Ok(storage_failure("reload seating chart", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(width: Option<f64>, grid: Option<f64>) -> UpdateChartRequest {
        UpdateChartRequest {
            canvas_width: width,
            canvas_height: None,
            grid_size: grid,
            snap_enabled: None,
        }
    }

    #[test]
    fn test_chart_update_bounds() {
        assert!(validate_chart_update(&update(Some(1200.0), Some(40.0))).is_ok());
        assert!(validate_chart_update(&update(None, None)).is_ok());
        assert!(validate_chart_update(&update(Some(50.0), None)).is_err());
        assert!(validate_chart_update(&update(Some(f64::NAN), None)).is_err());
        assert!(validate_chart_update(&update(None, Some(0.0))).is_err());
    }
}
