pub mod create;
pub mod delete;
pub mod export;
pub mod get;
pub mod leaderboard;
pub mod list;
pub mod live;
pub mod reset;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classrooms::requests::{
    CreateClassroomRequest, LeaderboardQuery, UpdateClassroomRequest,
};
use crate::storage::Storage;

pub struct ClassroomService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassroomService {
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

    // 当前教师的班级列表
    pub async fn list_classrooms(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_classrooms(self, request).await
    }

    pub async fn create_classroom(
        &self,
        request: &HttpRequest,
        body: CreateClassroomRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_classroom(self, request, body).await
    }

    // 班级详情（由中间件加载）
    pub async fn get_classroom(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_classroom(self, request).await
    }

    pub async fn update_classroom(
        &self,
        request: &HttpRequest,
        body: UpdateClassroomRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_classroom(self, request, body).await
    }

    // 删除班级及其学生、流水、座位表
    pub async fn delete_classroom(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        delete::delete_classroom(self, request).await
    }

    // 清空班级积分
    pub async fn reset_points(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        reset::reset_points(self, request).await
    }

    // 按流水重新计算汇总
    pub async fn recompute_totals(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        reset::recompute_totals(self, request).await
    }

    // 导出 CSV
    pub async fn export_csv(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        export::export_classroom(self, request).await
    }

    pub async fn leaderboard(
        &self,
        request: &HttpRequest,
        query: LeaderboardQuery,
    ) -> ActixResult<HttpResponse> {
        leaderboard::get_leaderboard(self, request, query).await
    }

    // 实时汇总视图
    pub async fn live_totals(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        live::get_live_totals(self, request).await
    }
}
