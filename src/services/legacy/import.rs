use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::{LegacyService, build_import_plan, migrate_blob};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::legacy::requests::LegacyImportRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn import_legacy(
    service: &LegacyService,
    request: &HttpRequest,
    body: LegacyImportRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        )));
    };
    let storage = service.get_storage(request);

    let migrated = match migrate_blob(body.data) {
        Ok(migrated) => migrated,
        Err(msg) => {
            warn!("Rejected legacy data from {}: {}", user_id, msg);
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::LegacyDataInvalid, msg)));
        }
    };

    let behaviors = match storage.list_behaviors(&user_id).await {
        Ok(behaviors) => behaviors,
        Err(e) => {
            error!("Failed to list behaviors for legacy import: {}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "Failed to load behaviors",
            )));
        }
    };

    let block_on_orphans = AppConfig::get().migration.block_on_orphans;
    let outcome = match build_import_plan(migrated, &user_id, &behaviors, block_on_orphans) {
        Ok(outcome) => outcome,
        Err(msg) => {
            return Ok(HttpResponse::UnprocessableEntity()
                .json(ApiResponse::error_empty(ErrorCode::LegacyOrphanedRecords, msg)));
        }
    };

    let mut report = outcome.report;
    report.dry_run = body.dry_run;
    if body.dry_run {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(report, "Legacy data validated")));
    }

    match storage.import_legacy(outcome.plan).await {
        Ok(()) => {
            info!(
                "User {} imported legacy v{} data: {} classrooms, {} students, {} transactions",
                user_id,
                report.source_version,
                report.created.classrooms,
                report.created.students,
                report.created.transactions
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(report, "Legacy data imported")))
        }
        Err(e) => {
            error!("Legacy import failed for {}: {}", user_id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::LegacyImportFailed,
                format!("Legacy import failed: {}", e.message()),
            )))
        }
    }
}
