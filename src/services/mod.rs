pub mod auth;
pub mod behaviors;
pub mod classrooms;
pub mod legacy;
pub mod points;
pub mod presets;
pub mod realtime;
pub mod seating;
pub mod sounds;
pub mod students;
pub mod sync;
pub mod system;
pub mod transactions;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::models::{ApiResponse, ErrorCode};

pub use auth::AuthService;
pub use behaviors::BehaviorService;
pub use classrooms::ClassroomService;
pub use legacy::LegacyService;
pub use points::LiveTotals;
pub use presets::PresetService;
pub use realtime::{RealtimeHub, RealtimeService};
pub use seating::SeatingService;
pub use sounds::SoundService;
pub use students::StudentService;
pub use sync::SyncManager;
pub use system::SystemService;
pub use transactions::TransactionService;

fn shared_state<T: Send + Sync + 'static>(request: &HttpRequest) -> Arc<T> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .expect("Shared state not found in app data")
        .get_ref()
        .clone()
}

/// 实时积分汇总
pub(crate) fn live_totals(request: &HttpRequest) -> Arc<LiveTotals> {
    shared_state::<LiveTotals>(request)
}

/// 变更广播
pub(crate) fn realtime_hub(request: &HttpRequest) -> Arc<RealtimeHub> {
    shared_state::<RealtimeHub>(request)
}

/// 离线写入队列
pub(crate) fn sync_manager(request: &HttpRequest) -> Arc<SyncManager> {
    shared_state::<SyncManager>(request)
}

/// 路由未挂 RequireClassroomOwner 时请求扩展里没有班级
pub(crate) fn classroom_context_missing() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "Classroom context missing",
    ))
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized: missing user id",
    ))
}
