pub mod award;
pub mod history;
pub mod undo;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::transactions::requests::{AwardPointsRequest, BatchAwardRequest, HistoryQuery};
use crate::storage::Storage;

pub struct TransactionService {
    storage: Option<Arc<dyn Storage>>,
}

impl TransactionService {
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

    // 奖励单个学生
    pub async fn award(
        &self,
        request: &HttpRequest,
        body: AwardPointsRequest,
    ) -> ActixResult<HttpResponse> {
        award::award_points(self, request, body).await
    }

    // 多选或全班奖励
    pub async fn batch_award(
        &self,
        request: &HttpRequest,
        body: BatchAwardRequest,
    ) -> ActixResult<HttpResponse> {
        award::batch_award_points(self, request, body).await
    }

    // 撤销最近一次写入
    pub async fn undo_latest(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        undo::undo_latest(self, request).await
    }

    pub async fn undo_transaction(
        &self,
        request: &HttpRequest,
        transaction_id: String,
    ) -> ActixResult<HttpResponse> {
        undo::undo_transaction(self, request, transaction_id).await
    }

    pub async fn undo_batch(
        &self,
        request: &HttpRequest,
        batch_id: String,
    ) -> ActixResult<HttpResponse> {
        undo::undo_batch(self, request, batch_id).await
    }

    pub async fn history(
        &self,
        request: &HttpRequest,
        query: HistoryQuery,
    ) -> ActixResult<HttpResponse> {
        history::list_history(self, request, query).await
    }

    // 当前可撤销的单元
    pub async fn undoable(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        history::get_undoable(self, request).await
    }
}

/// 撤销窗口
pub(crate) fn undo_window() -> chrono::Duration {
    chrono::Duration::seconds(crate::config::AppConfig::get().points.undo_window_secs.max(0))
}
