/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <JWT>`，成功后把当前教师的 `User` 放入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/api/v1/classrooms")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_classrooms));
 *
 * async fn list_classrooms(req: HttpRequest) -> ActixResult<HttpResponse> {
 *     let user_id = RequireJWT::extract_user_id(&req);
 *     // ...
 * }
 * ```
 *
 * 认证后的用户按 token 缓存 `cache.default_ttl` 秒，缓存未命中时回源存储并检查账户状态。
 * WebSocket 握手无法携带请求头，实时通道复用 [`authenticate_token`] 校验查询参数中的 token。
 */

use crate::cache::{CacheResult, ObjectCache, ObjectCacheExt};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserStatus};
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

/// 校验 access token 并取得对应的活跃用户
pub async fn authenticate_token(
    token: &str,
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
) -> Result<User, String> {
    let claims = crate::utils::jwt::JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache_key = user_cache_key(token);
    match cache.get_json::<User>(&cache_key).await {
        CacheResult::Found(user) if user.id == claims.sub => return Ok(user),
        CacheResult::Found(_) => cache.remove(&cache_key).await,
        _ => debug!("User not cached for token subject {}", claims.sub),
    }

    let user = storage
        .get_user_by_id(&claims.sub)
        .await
        .map_err(|_| "Failed to retrieve user from storage".to_string())?
        .ok_or_else(|| "User not found".to_string())?;

    if user.status != UserStatus::Active {
        return Err("User is not active".to_string());
    }

    cache
        .insert_json(cache_key, &user, AppConfig::get().cache.default_ttl)
        .await;

    Ok(user)
}

async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Storage not configured".to_string())?;
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Cache not configured".to_string())?;

    authenticate_token(token, &storage, &cache).await
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
            // 预检请求直接放行给 CORS 处理
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(
                    req.into_response(HttpResponse::NoContent().finish().map_into_right_body())
                );
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取当前用户，需在 RequireJWT 之后调用
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<String> {
        req.extensions().get::<User>().map(|user| user.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaObjectCache;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::utils::jwt::JwtUtils;

    async fn fixtures() -> (Arc<dyn Storage>, Arc<dyn ObjectCache>, User) {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let user = storage
            .create_user(CreateUserRequest {
                username: "ms_frizzle".to_string(),
                email: "frizzle@example.com".to_string(),
                password_hash: "hashed".to_string(),
                role: UserRole::Teacher,
                display_name: None,
            })
            .await
            .unwrap();
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaObjectCache::with_settings(100, 60));
        (Arc::new(storage), cache, user)
    }

    #[tokio::test]
    async fn test_authenticate_token_resolves_and_caches_user() {
        let (storage, cache, user) = fixtures().await;
        let token = JwtUtils::generate_access_token(&user.id, "teacher").unwrap();

        let found = authenticate_token(&token, &storage, &cache).await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(matches!(
            cache.get_raw(&user_cache_key(&token)).await,
            CacheResult::Found(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_token_rejects_garbage() {
        let (storage, cache, _) = fixtures().await;
        assert!(authenticate_token("not-a-jwt", &storage, &cache).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let (storage, cache, user) = fixtures().await;
        let refresh = JwtUtils::generate_refresh_token(&user.id, "teacher", None).unwrap();
        assert!(authenticate_token(&refresh, &storage, &cache).await.is_err());
    }
}
