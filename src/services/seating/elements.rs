use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::geometry::{
    DragSession, Point, ResizeHandle, Size, SnapMode, element_rect, next_rotation, resize,
    snap_to_grid,
};
use super::{SeatingService, invalid, load_chart, publish, storage_failure};
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::entities::Classroom;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::seating::entities::{
    NewRoomElement, RoomElement, RoomElementUpdate, SeatingChart,
};
use crate::models::seating::requests::{
    CreateElementRequest, MoveRequest, ResizeElementRequest, UpdateElementRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{classroom_context_missing, realtime_hub};
use crate::storage::Storage;

const MAX_LABEL_CHARS: usize = 50;

fn canvas(chart: &SeatingChart) -> Size {
    Size {
        width: chart.canvas_width,
        height: chart.canvas_height,
    }
}

fn element_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::RoomElementNotFound,
        "Room element not found",
    ))
}

/// 空白标签视为清除
pub fn normalize_label(label: Option<&str>) -> Result<Option<String>, String> {
    let label = label.map(str::trim).filter(|l| !l.is_empty());
    match label {
        Some(l) if l.chars().count() > MAX_LABEL_CHARS => Err(format!(
            "Label must be at most {MAX_LABEL_CHARS} characters"
        )),
        other => Ok(other.map(str::to_string)),
    }
}

/// 新设施的尺寸与位置
pub fn plan_element(chart: &SeatingChart, body: &CreateElementRequest) -> Result<NewRoomElement, String> {
    let snap = SnapMode::new(chart.snap_enabled, body.snap_override);
    let grid = chart.grid_size;
    let min = if grid > 0.0 { grid } else { 1.0 };
    let (default_width, default_height) = body.kind.default_size(grid);

    let sized = |value: Option<f64>, default: f64, field: &str| -> Result<f64, String> {
        match value {
            Some(v) if !v.is_finite() || v <= 0.0 => Err(format!("{field} must be positive")),
            Some(v) => Ok(snap_to_grid(v, grid, snap.is_active()).max(min)),
            None => Ok(default),
        }
    };
    let width = sized(body.width, default_width, "width")?;
    let height = sized(body.height, default_height, "height")?;

    let position = DragSession::start(
        Point {
            x: body.x,
            y: body.y,
        },
        Size { width, height },
        0,
        canvas(chart),
        grid,
    )
    .commit(0.0, 0.0, snap);

    Ok(NewRoomElement {
        kind: body.kind,
        label: normalize_label(body.label.as_deref())?,
        x: position.x,
        y: position.y,
        width,
        height,
    })
}

struct Loaded {
    classroom: Classroom,
    chart: SeatingChart,
    element: RoomElement,
}

async fn load_element(
    storage: &std::sync::Arc<dyn Storage>,
    request: &HttpRequest,
    element_id: &str,
) -> Result<Loaded, HttpResponse> {
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Err(classroom_context_missing());
    };
    let chart = load_chart(storage, &classroom).await?;
    let Some(element) = chart.elements.iter().find(|e| e.id == element_id).cloned() else {
        return Err(element_not_found());
    };
    Ok(Loaded {
        classroom,
        chart,
        element,
    })
}

async fn apply_update(
    storage: &std::sync::Arc<dyn Storage>,
    request: &HttpRequest,
    loaded: Loaded,
    update: RoomElementUpdate,
    message: &str,
) -> HttpResponse {
    match storage.update_element(&loaded.element.id, update).await {
        Ok(Some(updated)) => {
            publish(
                &realtime_hub(request),
                &loaded.classroom,
                ChangeTable::RoomElements,
                ChangeKind::Update,
                Some(&updated),
                Some(&loaded.element),
            );
            HttpResponse::Ok().json(ApiResponse::success(updated, message))
        }
        Ok(None) => element_not_found(),
        Err(e) => storage_failure("update room element", e),
    }
}

pub async fn create_element(
    service: &SeatingService,
    request: &HttpRequest,
    body: CreateElementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let chart = match load_chart(&storage, &classroom).await {
        Ok(chart) => chart,
        Err(resp) => return Ok(resp),
    };
    let element = match plan_element(&chart, &body) {
        Ok(element) => element,
        Err(msg) => return Ok(invalid(msg)),
    };

    match storage.create_element(&chart.id, element).await {
        Ok(created) => {
            publish(
                &realtime_hub(request),
                &classroom,
                ChangeTable::RoomElements,
                ChangeKind::Insert,
                Some(&created),
                None,
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                created,
                "Room element created successfully",
            )))
        }
        Err(e) => Ok(storage_failure("create room element", e)),
    }
}

pub async fn update_element(
    service: &SeatingService,
    request: &HttpRequest,
    element_id: String,
    body: UpdateElementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let loaded = match load_element(&storage, request, &element_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };
    let label = match normalize_label(body.label.as_deref()) {
        Ok(label) => label,
        Err(msg) => return Ok(invalid(msg)),
    };

    let update = RoomElementUpdate {
        label: Some(label),
        ..Default::default()
    };
    Ok(apply_update(&storage, request, loaded, update, "Room element updated successfully").await)
}

pub async fn move_element(
    service: &SeatingService,
    request: &HttpRequest,
    element_id: String,
    body: MoveRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let loaded = match load_element(&storage, request, &element_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    let rect = element_rect(&loaded.element);
    let stored = DragSession::start(
        Point {
            x: rect.x,
            y: rect.y,
        },
        rect.size(),
        loaded.element.rotation,
        canvas(&loaded.chart),
        loaded.chart.grid_size,
    )
    .commit_at(
        Point {
            x: body.x,
            y: body.y,
        },
        SnapMode::new(loaded.chart.snap_enabled, body.snap_override),
    );

    let update = RoomElementUpdate {
        x: Some(stored.x),
        y: Some(stored.y),
        ..Default::default()
    };
    Ok(apply_update(&storage, request, loaded, update, "Room element moved successfully").await)
}

/// 八向缩放，位移相对拖动开始时的矩形
pub async fn resize_element(
    service: &SeatingService,
    request: &HttpRequest,
    element_id: String,
    body: ResizeElementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let handle: ResizeHandle = match body.handle.parse() {
        Ok(handle) => handle,
        Err(msg) => return Ok(invalid(msg)),
    };
    if !(body.dx.is_finite() && body.dy.is_finite()) {
        return Ok(invalid("Resize delta must be finite"));
    }
    let loaded = match load_element(&storage, request, &element_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    let snap = SnapMode::new(loaded.chart.snap_enabled, body.snap_override);
    let rect = resize(
        element_rect(&loaded.element),
        handle,
        body.dx,
        body.dy,
        loaded.chart.grid_size,
        snap.is_active(),
    );

    let update = RoomElementUpdate {
        x: Some(rect.x),
        y: Some(rect.y),
        width: Some(rect.width),
        height: Some(rect.height),
        ..Default::default()
    };
    Ok(apply_update(&storage, request, loaded, update, "Room element resized successfully").await)
}

pub async fn rotate_element(
    service: &SeatingService,
    request: &HttpRequest,
    element_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let loaded = match load_element(&storage, request, &element_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    let update = RoomElementUpdate {
        rotation: Some(next_rotation(loaded.element.rotation)),
        ..Default::default()
    };
    Ok(apply_update(&storage, request, loaded, update, "Room element rotated successfully").await)
}

pub async fn delete_element(
    service: &SeatingService,
    request: &HttpRequest,
    element_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let loaded = match load_element(&storage, request, &element_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_element(&loaded.element.id).await {
        Ok(true) => {
            publish(
                &realtime_hub(request),
                &loaded.classroom,
                ChangeTable::RoomElements,
                ChangeKind::Delete,
                None,
                Some(&loaded.element),
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Room element deleted successfully")))
        }
        Ok(false) => Ok(element_not_found()),
        Err(e) => Ok(storage_failure("delete room element", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seating::entities::RoomElementKind;

    fn chart() -> SeatingChart {
        SeatingChart {
            id: "chart".to_string(),
            classroom_id: "c1".to_string(),
            canvas_width: 800.0,
            canvas_height: 600.0,
            grid_size: 40.0,
            snap_enabled: true,
            groups: Vec::new(),
            elements: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn request(width: Option<f64>) -> CreateElementRequest {
        CreateElementRequest {
            kind: RoomElementKind::TeacherDesk,
            label: Some("  Front desk ".to_string()),
            x: 101.0,
            y: 19.0,
            width,
            height: None,
            snap_override: false,
        }
    }

    #[test]
    fn test_plan_element_defaults_and_snapping() {
        let element = plan_element(&chart(), &request(None)).unwrap();
        assert_eq!((element.width, element.height), (160.0, 80.0));
        assert_eq!((element.x, element.y), (120.0, 0.0));
        assert_eq!(element.label.as_deref(), Some("Front desk"));

        let element = plan_element(&chart(), &request(Some(10.0))).unwrap();
        assert_eq!(element.width, 40.0);

        assert!(plan_element(&chart(), &request(Some(-5.0))).is_err());
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(normalize_label(Some("   ")).unwrap(), None);
        assert_eq!(normalize_label(None).unwrap(), None);
        assert!(normalize_label(Some(&"x".repeat(51))).is_err());
    }
}
