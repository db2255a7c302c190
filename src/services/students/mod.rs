pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod name_parser;
pub mod roster;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::students::requests::{
    BulkCreateStudentsRequest, CreateStudentRequest, ParseRosterRequest, UpdateStudentRequest,
};
use crate::storage::Storage;

pub use name_parser::{ParsedRoster, display_names, parse_roster};

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    pub async fn list_students(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_students(self, request).await
    }

    pub async fn create_student(
        &self,
        request: &HttpRequest,
        body: CreateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, request, body).await
    }

    // 批量创建（名单导入确认后调用）
    pub async fn bulk_create_students(
        &self,
        request: &HttpRequest,
        body: BulkCreateStudentsRequest,
    ) -> ActixResult<HttpResponse> {
        create::bulk_create_students(self, request, body).await
    }

    pub async fn get_student(
        &self,
        request: &HttpRequest,
        student_id: String,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, request, student_id).await
    }

    pub async fn update_student(
        &self,
        request: &HttpRequest,
        student_id: String,
        body: UpdateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, request, student_id, body).await
    }

    pub async fn delete_student(
        &self,
        request: &HttpRequest,
        student_id: String,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, request, student_id).await
    }

    // 解析粘贴的名单文本
    pub async fn preview_roster(&self, body: ParseRosterRequest) -> ActixResult<HttpResponse> {
        roster::preview_roster(body).await
    }

    // 解析上传的名单文件
    pub async fn upload_roster(&self, payload: Multipart) -> ActixResult<HttpResponse> {
        roster::upload_roster(payload).await
    }
}
