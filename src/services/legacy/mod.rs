pub mod blob;
pub mod import;
pub mod plan;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::legacy::requests::LegacyImportRequest;
use crate::storage::Storage;

pub use blob::{MigratedBlob, migrate_blob};
pub use plan::{PlanOutcome, build_import_plan};

pub struct LegacyService {
    storage: Option<Arc<dyn Storage>>,
}

impl LegacyService {
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

    // 导入旧版本地存储数据
    pub async fn import_legacy(
        &self,
        request: &HttpRequest,
        body: LegacyImportRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_legacy(self, request, body).await
    }
}
