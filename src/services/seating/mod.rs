/*!
 * 座位表
 *
 * 每个班级一张座位表，首次访问时按配置默认值创建。
 * 位置相关的请求都提交未吸附的原始坐标，由服务端吸附并限制在画布内。
 */

pub mod assignment;
pub mod chart;
pub mod elements;
pub mod geometry;
pub mod groups;
pub mod seats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::classrooms::entities::Classroom;
use crate::models::realtime::entities::{ChangeKind, ChangeTable};
use crate::models::seating::entities::SeatingChart;
use crate::models::seating::requests::{
    ApplyPresetRequest, AssignSeatRequest, CreateElementRequest, CreateGroupRequest, MoveRequest,
    ResizeElementRequest, UpdateChartRequest, UpdateElementRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::RealtimeHub;
use crate::storage::Storage;

pub use assignment::{SeatPlan, capture_layout, current_seat_of, plan_random_seating};
pub use geometry::{SnapMode, snap_to_grid};

pub struct SeatingService {
    storage: Option<Arc<dyn Storage>>,
}

impl SeatingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn get_chart(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        chart::get_chart(self, request).await
    }

    pub async fn update_chart(
        &self,
        request: &HttpRequest,
        body: UpdateChartRequest,
    ) -> ActixResult<HttpResponse> {
        chart::update_chart(self, request, body).await
    }

    // 随机排座
    pub async fn randomize(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        chart::randomize(self, request).await
    }

    // 应用布局预设，清除现有组、设施和座位分配
    pub async fn apply_preset(
        &self,
        request: &HttpRequest,
        body: ApplyPresetRequest,
    ) -> ActixResult<HttpResponse> {
        chart::apply_preset(self, request, body).await
    }

    pub async fn create_group(
        &self,
        request: &HttpRequest,
        body: CreateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        groups::create_group(self, request, body).await
    }

    pub async fn move_group(
        &self,
        request: &HttpRequest,
        group_id: String,
        body: MoveRequest,
    ) -> ActixResult<HttpResponse> {
        groups::move_group(self, request, group_id, body).await
    }

    pub async fn rotate_group(
        &self,
        request: &HttpRequest,
        group_id: String,
    ) -> ActixResult<HttpResponse> {
        groups::rotate_group(self, request, group_id).await
    }

    pub async fn delete_group(
        &self,
        request: &HttpRequest,
        group_id: String,
    ) -> ActixResult<HttpResponse> {
        groups::delete_group(self, request, group_id).await
    }

    pub async fn assign_seat(
        &self,
        request: &HttpRequest,
        seat_id: String,
        body: AssignSeatRequest,
    ) -> ActixResult<HttpResponse> {
        seats::assign_seat(self, request, seat_id, body).await
    }

    pub async fn unassign_seat(
        &self,
        request: &HttpRequest,
        seat_id: String,
    ) -> ActixResult<HttpResponse> {
        seats::unassign_seat(self, request, seat_id).await
    }

    pub async fn create_element(
        &self,
        request: &HttpRequest,
        body: CreateElementRequest,
    ) -> ActixResult<HttpResponse> {
        elements::create_element(self, request, body).await
    }

    pub async fn update_element(
        &self,
        request: &HttpRequest,
        element_id: String,
        body: UpdateElementRequest,
    ) -> ActixResult<HttpResponse> {
        elements::update_element(self, request, element_id, body).await
    }

    pub async fn move_element(
        &self,
        request: &HttpRequest,
        element_id: String,
        body: MoveRequest,
    ) -> ActixResult<HttpResponse> {
        elements::move_element(self, request, element_id, body).await
    }

    pub async fn resize_element(
        &self,
        request: &HttpRequest,
        element_id: String,
        body: ResizeElementRequest,
    ) -> ActixResult<HttpResponse> {
        elements::resize_element(self, request, element_id, body).await
    }

    pub async fn rotate_element(
        &self,
        request: &HttpRequest,
        element_id: String,
    ) -> ActixResult<HttpResponse> {
        elements::rotate_element(self, request, element_id).await
    }

    pub async fn delete_element(
        &self,
        request: &HttpRequest,
        element_id: String,
    ) -> ActixResult<HttpResponse> {
        elements::delete_element(self, request, element_id).await
    }
}

/// 读取（必要时创建）班级的座位表
pub(crate) async fn load_chart(
    storage: &Arc<dyn Storage>,
    classroom: &Classroom,
) -> Result<SeatingChart, HttpResponse> {
    storage
        .get_or_create_chart(&classroom.id, &AppConfig::get().seating)
        .await
        .map_err(|e| {
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load seating chart: {e}"),
            ))
        })
}

pub(crate) fn storage_failure(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("Failed to {action}: {e}"),
    ))
}

pub(crate) fn invalid(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::SeatingInvalid, message))
}

/// 推送座位表相关行变更
pub(crate) fn publish<T: serde::Serialize>(
    hub: &RealtimeHub,
    classroom: &Classroom,
    table: ChangeTable,
    kind: ChangeKind,
    new: Option<&T>,
    old: Option<&T>,
) {
    hub.publish_row(
        table,
        kind,
        Some(&classroom.user_id),
        Some(&classroom.id),
        new,
        old,
    );
}
