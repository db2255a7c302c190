/*!
 * 班级归属校验中间件
 *
 * 挂在 `/api/v1/classrooms/{classroom_id}` 作用域上，必须位于 RequireJWT 之后。
 * 校验路径中的班级存在且属于当前教师（管理员放行），并把 `Classroom` 放入请求扩展：
 *
 * ```rust,ignore
 * web::scope("/{classroom_id}")
 *     .wrap(RequireClassroomOwner)
 *     .route("/students", web::get().to(list_students))
 *
 * let classroom = RequireClassroomOwner::extract_classroom(&req);
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error};

use crate::{
    models::{ErrorCode, classrooms::entities::Classroom, users::entities::User},
    storage::Storage,
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireClassroomOwner;

impl<S, B> Transform<S, ServiceRequest> for RequireClassroomOwner
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassroomOwnerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassroomOwnerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireClassroomOwnerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireClassroomOwnerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            // 1. 当前用户
            let user_opt = req.extensions().get::<User>().cloned();
            let user = match user_opt {
                Some(user) => user,
                None => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Unauthorized: missing user claims",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 2. classroom_id
            let classroom_id = match req
                .match_info()
                .get("classroom_id")
                .and_then(|s| uuid::Uuid::parse_str(s).ok())
            {
                Some(id) => id.to_string(),
                None => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::BAD_REQUEST,
                            ErrorCode::BadRequest,
                            "Missing or invalid classroom_id",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 3. 加载班级
            let classroom = match load_classroom(&req, &classroom_id).await {
                Ok(Some(classroom)) => classroom,
                Ok(None) => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::NOT_FOUND,
                            ErrorCode::ClassroomNotFound,
                            "Classroom not found",
                        )
                        .map_into_right_body(),
                    ));
                }
                Err(msg) => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            &msg,
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 4. 归属校验，管理员直接放行
            if classroom.user_id != user.id && !user.is_admin() {
                debug!(
                    "User {} denied access to classroom {}",
                    user.id, classroom.id
                );
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        ErrorCode::ClassroomPermissionDenied,
                        "No permission for this classroom",
                    )
                    .map_into_right_body(),
                ));
            }

            req.extensions_mut().insert(classroom);
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

impl RequireClassroomOwner {
    /// 从请求扩展中提取已校验的班级
    pub fn extract_classroom(req: &actix_web::HttpRequest) -> Option<Classroom> {
        req.extensions().get::<Classroom>().cloned()
    }
}

async fn load_classroom(req: &ServiceRequest, classroom_id: &str) -> Result<Option<Classroom>, String> {
    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Storage not configured".to_string())?;

    storage.get_classroom(classroom_id).await.map_err(|e| {
        error!("Failed to load classroom {}: {}", classroom_id, e);
        "Failed to load classroom".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};
    use crate::storage::sea_orm_storage::test_support::storage_with_teacher;
    use actix_web::{App, HttpRequest, HttpResponse, test};

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            username: "someone".to_string(),
            email: "someone@example.com".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    async fn echo(req: HttpRequest) -> HttpResponse {
        match RequireClassroomOwner::extract_classroom(&req) {
            Some(classroom) => HttpResponse::Ok().body(classroom.name),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_owner_admin_and_stranger() {
        let (storage, owner_id) = storage_with_teacher().await;
        let classroom = storage.create_classroom(&owner_id, "Room 7").await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new().app_data(web::Data::new(storage)).service(
                web::scope("/classrooms/{classroom_id}")
                    .wrap(RequireClassroomOwner)
                    .route("", web::get().to(echo)),
            ),
        )
        .await;
        let uri = format!("/classrooms/{}", classroom.id);

        let req = test::TestRequest::get().uri(&uri).to_request();
        req.extensions_mut().insert(user(&owner_id, UserRole::Teacher));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "Room 7");

        let req = test::TestRequest::get().uri(&uri).to_request();
        req.extensions_mut().insert(user("stranger", UserRole::Teacher));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri(&uri).to_request();
        req.extensions_mut().insert(user("root", UserRole::Admin));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let missing = format!("/classrooms/{}", uuid::Uuid::new_v4());
        let req = test::TestRequest::get().uri(&missing).to_request();
        req.extensions_mut().insert(user(&owner_id, UserRole::Teacher));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/classrooms/not-a-uuid").to_request();
        req.extensions_mut().insert(user(&owner_id, UserRole::Teacher));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let (storage, owner_id) = storage_with_teacher().await;
        let classroom = storage.create_classroom(&owner_id, "Room 7").await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new().app_data(web::Data::new(storage)).service(
                web::scope("/classrooms/{classroom_id}")
                    .wrap(RequireClassroomOwner)
                    .route("", web::get().to(echo)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/classrooms/{}", classroom.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
