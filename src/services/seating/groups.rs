use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::assignment::next_group_letter;
use super::geometry::{DragSession, Point, Size, SnapMode, group_size, next_rotation, visual_bounds};
use super::{SeatingService, load_chart, publish, storage_failure};
use crate::config::AppConfig;
use crate::middlewares::RequireClassroomOwner;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::seating::entities::{SeatingChart, SeatingGroup, SeatingGroupUpdate};
use crate::models::seating::requests::{CreateGroupRequest, MoveRequest};
use crate::models::seating::responses::RotateResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{classroom_context_missing, realtime_hub};

fn canvas(chart: &SeatingChart) -> Size {
    Size {
        width: chart.canvas_width,
        height: chart.canvas_height,
    }
}

fn group_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::SeatingGroupNotFound,
        "Seating group not found",
    ))
}

fn find_group(chart: &SeatingChart, group_id: &str) -> Option<SeatingGroup> {
    chart.groups.iter().find(|g| g.id == group_id).cloned()
}

/// 新座位组的存储位置：吸附并限制在画布内
pub fn placement(chart: &SeatingChart, x: f64, y: f64, snap_override: bool) -> Point {
    let mode = SnapMode::new(chart.snap_enabled, snap_override);
    DragSession::start(
        Point { x, y },
        group_size(chart.grid_size),
        0,
        canvas(chart),
        chart.grid_size,
    )
    .commit(0.0, 0.0, mode)
}

pub async fn create_group(
    service: &SeatingService,
    request: &HttpRequest,
    body: CreateGroupRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };

    let max_groups = AppConfig::get().seating.max_groups;
    let Some(letter) = next_group_letter(&chart, max_groups) else {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::SeatingInvalid,
            format!("A seating chart can have at most {max_groups} groups"),
        )));
    };
    let position = placement(&chart, body.x, body.y, body.snap_override);

    match storage
        .create_group(&chart.id, &letter, position.x, position.y)
        .await
    {
        Ok(group) => {
            info!("Group {} added to chart {}", group.letter, chart.id);
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingGroups,
                ChangeKind::Insert,
                Some(&group),
                None,
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                group,
                "Seating group created successfully",
            )))
        }
        Err(e) => Ok(storage_failure("create seating group", e)),
    }
}

/// 拖动结束：请求中的坐标是视觉左上角
pub async fn move_group(
    service: &SeatingService,
    request: &HttpRequest,
    group_id: String,
    body: MoveRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let Some(group) = find_group(&chart, &group_id) else {
        return Ok(group_not_found());
    };

    let session = DragSession::start(
        Point {
            x: group.x,
            y: group.y,
        },
        group_size(chart.grid_size),
        group.rotation,
        canvas(&chart),
        chart.grid_size,
    );
    let stored = session.commit_at(
        Point {
            x: body.x,
            y: body.y,
        },
        SnapMode::new(chart.snap_enabled, body.snap_override),
    );

    let update = SeatingGroupUpdate {
        x: Some(stored.x),
        y: Some(stored.y),
        rotation: None,
    };
    match storage.update_group(&group.id, update).await {
        Ok(Some(updated)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingGroups,
                ChangeKind::Update,
                Some(&updated),
                Some(&group),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                updated,
                "Seating group moved successfully",
            )))
        }
        Ok(None) => Ok(group_not_found()),
        Err(e) => Ok(storage_failure("move seating group", e)),
    }
}

/// 顺时针旋转 90 度；存储位置不变，返回新的视觉位置
pub async fn rotate_group(
    service: &SeatingService,
    request: &HttpRequest,
    group_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let Some(group) = find_group(&chart, &group_id) else {
        return Ok(group_not_found());
    };

    let rotation = next_rotation(group.rotation);
    let update = SeatingGroupUpdate {
        rotation: Some(rotation),
        ..Default::default()
    };
    match storage.update_group(&group.id, update).await {
        Ok(Some(updated)) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingGroups,
                ChangeKind::Update,
                Some(&updated),
                Some(&group),
            );
            let visual = visual_bounds(
                Point {
                    x: updated.x,
                    y: updated.y,
                },
                group_size(chart.grid_size),
                rotation,
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RotateResponse {
                    id: updated.id,
                    rotation,
                    x: visual.x,
                    y: visual.y,
                },
                "Seating group rotated successfully",
            )))
        }
        Ok(None) => Ok(group_not_found()),
        Err(e) => Ok(storage_failure("rotate seating group", e)),
    }
}

pub async fn delete_group(
    service: &SeatingService,
    request: &HttpRequest,
    group_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let Some(group) = find_group(&chart, &group_id) else {
        return Ok(group_not_found());
    };

    match storage.delete_group(&group.id).await {
        Ok(true) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::SeatingGroups,
                ChangeKind::Delete,
                None,
                Some(&group),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Seating group deleted successfully")))
        }
        Ok(false) => Ok(group_not_found()),
        Err(e) => Ok(storage_failure("delete seating group", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(snap: bool) -> SeatingChart {
        SeatingChart {
            id: "chart".to_string(),
            classroom_id: "c1".to_string(),
            canvas_width: 800.0,
            canvas_height: 600.0,
            grid_size: 40.0,
            snap_enabled: snap,
            groups: Vec::new(),
            elements: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_new_group_is_snapped_and_clamped() {
        let position = placement(&chart(true), 47.0, 95.0, false);
        assert_eq!(position, Point { x: 40.0, y: 80.0 });

        let raw = placement(&chart(true), 47.0, 95.0, true);
        assert_eq!(raw, Point { x: 47.0, y: 95.0 });

        // 组宽 160，画布 800
        let clamped = placement(&chart(true), 790.0, -30.0, false);
        assert_eq!(clamped, Point { x: 640.0, y: 0.0 });
    }
}
