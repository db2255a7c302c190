use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classrooms::requests::{
    CreateClassroomRequest, LeaderboardQuery, UpdateClassroomRequest,
};
use crate::models::seating::requests::{
    ApplyPresetRequest, AssignSeatRequest, CreateElementRequest, CreateGroupRequest, MoveRequest,
    ResizeElementRequest, UpdateChartRequest, UpdateElementRequest,
};
use crate::models::students::requests::{
    BulkCreateStudentsRequest, CreateStudentRequest, ParseRosterRequest, UpdateStudentRequest,
};
use crate::models::transactions::requests::{AwardPointsRequest, BatchAwardRequest, HistoryQuery};
use crate::models::users::entities::UserRole;
use crate::services::{ClassroomService, SeatingService, StudentService, TransactionService};
use crate::utils::{
    SafeBatchId, SafeElementId, SafeGroupId, SafeSeatId, SafeStudentId, SafeTransactionId,
};

// 懒加载的全局服务实例
static CLASSROOM_SERVICE: Lazy<ClassroomService> = Lazy::new(ClassroomService::new_lazy);
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);
static TRANSACTION_SERVICE: Lazy<TransactionService> = Lazy::new(TransactionService::new_lazy);
static SEATING_SERVICE: Lazy<SeatingService> = Lazy::new(SeatingService::new_lazy);

// 班级
pub async fn list_classrooms(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.list_classrooms(&req).await
}

pub async fn create_classroom(
    req: HttpRequest,
    body: web::Json<CreateClassroomRequest>,
) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE
        .create_classroom(&req, body.into_inner())
        .await
}

pub async fn get_classroom(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.get_classroom(&req).await
}

pub async fn update_classroom(
    req: HttpRequest,
    body: web::Json<UpdateClassroomRequest>,
) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE
        .update_classroom(&req, body.into_inner())
        .await
}

pub async fn delete_classroom(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.delete_classroom(&req).await
}

pub async fn reset_points(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.reset_points(&req).await
}

pub async fn recompute_totals(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.recompute_totals(&req).await
}

pub async fn export_csv(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.export_csv(&req).await
}

pub async fn leaderboard(
    req: HttpRequest,
    query: web::Query<LeaderboardQuery>,
) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE
        .leaderboard(&req, query.into_inner())
        .await
}

pub async fn live_totals(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASSROOM_SERVICE.live_totals(&req).await
}

// 学生
pub async fn list_students(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_students(&req).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.create_student(&req, body.into_inner()).await
}

pub async fn bulk_create_students(
    req: HttpRequest,
    body: web::Json<BulkCreateStudentsRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .bulk_create_students(&req, body.into_inner())
        .await
}

pub async fn get_student(req: HttpRequest, student_id: SafeStudentId) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_student(&req, student_id.0).await
}

pub async fn update_student(
    req: HttpRequest,
    student_id: SafeStudentId,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(&req, student_id.0, body.into_inner())
        .await
}

pub async fn delete_student(
    req: HttpRequest,
    student_id: SafeStudentId,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.delete_student(&req, student_id.0).await
}

pub async fn preview_roster(body: web::Json<ParseRosterRequest>) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.preview_roster(body.into_inner()).await
}

pub async fn upload_roster(payload: Multipart) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.upload_roster(payload).await
}

// 积分流水
pub async fn award(
    req: HttpRequest,
    body: web::Json<AwardPointsRequest>,
) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE.award(&req, body.into_inner()).await
}

pub async fn batch_award(
    req: HttpRequest,
    body: web::Json<BatchAwardRequest>,
) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE
        .batch_award(&req, body.into_inner())
        .await
}

pub async fn history(
    req: HttpRequest,
    query: web::Query<HistoryQuery>,
) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE.history(&req, query.into_inner()).await
}

pub async fn undoable(req: HttpRequest) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE.undoable(&req).await
}

pub async fn undo_latest(req: HttpRequest) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE.undo_latest(&req).await
}

pub async fn undo_transaction(
    req: HttpRequest,
    transaction_id: SafeTransactionId,
) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE
        .undo_transaction(&req, transaction_id.0)
        .await
}

pub async fn undo_batch(req: HttpRequest, batch_id: SafeBatchId) -> ActixResult<HttpResponse> {
    TRANSACTION_SERVICE.undo_batch(&req, batch_id.0).await
}

// 座位表
pub async fn get_chart(req: HttpRequest) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.get_chart(&req).await
}

pub async fn update_chart(
    req: HttpRequest,
    body: web::Json<UpdateChartRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.update_chart(&req, body.into_inner()).await
}

pub async fn randomize(req: HttpRequest) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.randomize(&req).await
}

pub async fn apply_preset(
    req: HttpRequest,
    body: web::Json<ApplyPresetRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.apply_preset(&req, body.into_inner()).await
}

pub async fn create_group(
    req: HttpRequest,
    body: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.create_group(&req, body.into_inner()).await
}

pub async fn move_group(
    req: HttpRequest,
    group_id: SafeGroupId,
    body: web::Json<MoveRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .move_group(&req, group_id.0, body.into_inner())
        .await
}

pub async fn rotate_group(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.rotate_group(&req, group_id.0).await
}

pub async fn delete_group(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.delete_group(&req, group_id.0).await
}

pub async fn assign_seat(
    req: HttpRequest,
    seat_id: SafeSeatId,
    body: web::Json<AssignSeatRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .assign_seat(&req, seat_id.0, body.into_inner())
        .await
}

pub async fn unassign_seat(req: HttpRequest, seat_id: SafeSeatId) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.unassign_seat(&req, seat_id.0).await
}

pub async fn create_element(
    req: HttpRequest,
    body: web::Json<CreateElementRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .create_element(&req, body.into_inner())
        .await
}

pub async fn update_element(
    req: HttpRequest,
    element_id: SafeElementId,
    body: web::Json<UpdateElementRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .update_element(&req, element_id.0, body.into_inner())
        .await
}

pub async fn move_element(
    req: HttpRequest,
    element_id: SafeElementId,
    body: web::Json<MoveRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .move_element(&req, element_id.0, body.into_inner())
        .await
}

pub async fn resize_element(
    req: HttpRequest,
    element_id: SafeElementId,
    body: web::Json<ResizeElementRequest>,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE
        .resize_element(&req, element_id.0, body.into_inner())
        .await
}

pub async fn rotate_element(
    req: HttpRequest,
    element_id: SafeElementId,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.rotate_element(&req, element_id.0).await
}

pub async fn delete_element(
    req: HttpRequest,
    element_id: SafeElementId,
) -> ActixResult<HttpResponse> {
    SEATING_SERVICE.delete_element(&req, element_id.0).await
}

fn student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/students")
            .route(web::get().to(list_students))
            .route(web::post().to(create_student)),
    )
    .route("/students/bulk", web::post().to(bulk_create_students))
    .route("/students/roster/preview", web::post().to(preview_roster))
    .route("/students/roster/upload", web::post().to(upload_roster))
    .service(
        web::resource("/students/{student_id}")
            .route(web::get().to(get_student))
            .route(web::put().to(update_student))
            .route(web::delete().to(delete_student)),
    );
}

fn transaction_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/transactions")
            .route(web::get().to(history))
            .route(web::post().to(award)),
    )
    .route("/transactions/batch", web::post().to(batch_award))
    .route("/transactions/undoable", web::get().to(undoable))
    .route("/transactions/undo", web::post().to(undo_latest))
    .route(
        "/transactions/batches/{batch_id}/undo",
        web::post().to(undo_batch),
    )
    .route(
        "/transactions/{transaction_id}/undo",
        web::post().to(undo_transaction),
    );
}

fn seating_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/seating")
            .route(web::get().to(get_chart))
            .route(web::put().to(update_chart)),
    )
    .route("/seating/randomize", web::post().to(randomize))
    .route("/seating/apply-preset", web::post().to(apply_preset))
    .route("/seating/groups", web::post().to(create_group))
    .route("/seating/groups/{group_id}", web::delete().to(delete_group))
    .route("/seating/groups/{group_id}/move", web::put().to(move_group))
    .route(
        "/seating/groups/{group_id}/rotate",
        web::post().to(rotate_group),
    )
    .service(
        web::resource("/seating/seats/{seat_id}")
            .route(web::put().to(assign_seat))
            .route(web::delete().to(unassign_seat)),
    )
    .route("/seating/elements", web::post().to(create_element))
    .service(
        web::resource("/seating/elements/{element_id}")
            .route(web::put().to(update_element))
            .route(web::delete().to(delete_element)),
    )
    .route(
        "/seating/elements/{element_id}/move",
        web::put().to(move_element),
    )
    .route(
        "/seating/elements/{element_id}/resize",
        web::put().to(resize_element),
    )
    .route(
        "/seating/elements/{element_id}/rotate",
        web::post().to(rotate_element),
    );
}

// 配置路由
pub fn configure_classroom_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classrooms")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                // 教师查看自己的班级，管理员查看全部
                web::resource("")
                    .route(web::get().to(list_classrooms))
                    .route(web::post().to(create_classroom)),
            )
            .service(
                // 以下路由都要求班级属于当前教师
                web::scope("/{classroom_id}")
                    .wrap(middlewares::RequireClassroomOwner)
                    .service(
                        web::resource("")
                            .route(web::get().to(get_classroom))
                            .route(web::put().to(update_classroom))
                            .route(web::delete().to(delete_classroom)),
                    )
                    .route("/reset", web::post().to(reset_points))
                    .route("/recompute", web::post().to(recompute_totals))
                    .route("/export", web::get().to(export_csv))
                    .route("/leaderboard", web::get().to(leaderboard))
                    .route("/live", web::get().to(live_totals))
                    .configure(student_routes)
                    .configure(transaction_routes)
                    .configure(seating_routes),
            ),
    );
}
