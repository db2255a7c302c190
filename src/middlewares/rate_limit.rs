/*!
 * 速率限制中间件
 *
 * 固定窗口计数：每个键在窗口开始时清零，超过上限返回 429 和 `Retry-After`。
 *
 * ```rust,ignore
 * web::scope("/api/v1/auth")
 *     .service(
 *         web::resource("/login")
 *             .wrap(RateLimit::login())
 *             .route(web::post().to(login)),
 *     )
 * ```
 *
 * 已认证请求以用户 ID 为键，否则以客户端 IP 为键。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode};

/// 全局速率限制缓存
/// 键: 前缀:标识，值: 当前窗口
static RATE_LIMIT_CACHE: Lazy<Cache<String, FixedWindow>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

const MAX_WINDOW_SECS: u64 = 3600;

/// 一个键的计数窗口
#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    started: Instant,
    count: u32,
}

/// 单次计数的结果
#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Allowed { remaining: u32, reset_secs: u64 },
    Limited { retry_after: u64 },
}

impl FixedWindow {
    /// 计入一次请求，窗口过期时从新窗口开始
    fn hit(current: Option<Self>, now: Instant, window: Duration, max_requests: u32) -> (Self, Decision) {
        let window_state = match current {
            Some(w) if now.duration_since(w.started) < window => w,
            _ => FixedWindow {
                started: now,
                count: 0,
            },
        };
        let elapsed = now.duration_since(window_state.started);
        let reset_secs = window.saturating_sub(elapsed).as_secs().max(1);

        if window_state.count >= max_requests {
            return (
                window_state,
                Decision::Limited {
                    retry_after: reset_secs,
                },
            );
        }

        let next = FixedWindow {
            count: window_state.count + 1,
            ..window_state
        };
        (
            next,
            Decision::Allowed {
                remaining: max_requests.saturating_sub(next.count),
                reset_secs,
            },
        )
    }
}

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.clamp(1, MAX_WINDOW_SECS),
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录端点限制：5次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册端点限制：3次/分钟/IP
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 刷新令牌限制：10次/分钟/IP（防止暴力攻击）
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }

    /// 音效地址校验：10次/分钟/用户（每次都会发起外部 HEAD 请求）
    pub fn url_check() -> Self {
        Self::new(10, 60).with_prefix("url_check")
    }

    /// 旧版数据导入：5次/10分钟/用户
    pub fn legacy_import() -> Self {
        Self::new(5, 600).with_prefix("legacy_import")
    }

    /// 通用 API 限制：300次/分钟/用户，课堂上连续加分较为频繁
    pub fn api() -> Self {
        Self::new(300, 60).with_prefix("api")
    }
}

/// 从请求中提取客户端 IP
///
/// 安全注意事项：
/// - 如果服务部署在反向代理后面，需要在反向代理中配置正确的 X-Forwarded-For / X-Real-IP 头
/// - 此实现会验证 IP 格式，防止伪造的无效头导致问题
/// - 在不可信网络中直接暴露服务时，攻击者可能伪造转发头来绕过限制
fn extract_client_ip(req: &ServiceRequest) -> String {
    // 尝试从连接信息获取真实 IP（最可信）
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    // 如果连接信息有有效 IP，优先使用
    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 从 X-Forwarded-For 头获取（用于反向代理场景）
    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 从 X-Real-IP 头获取
    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 如果都没有有效 IP，使用连接信息的默认值
    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<String> {
    use crate::models::users::entities::User;
    req.extensions().get::<User>().map(|user| user.id.clone())
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            // 构建限制键
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            let current = RATE_LIMIT_CACHE.get(&cache_key).await;
            let (window, decision) = FixedWindow::hit(
                current,
                Instant::now(),
                Duration::from_secs(window_secs),
                max_requests,
            );
            RATE_LIMIT_CACHE.insert(cache_key.clone(), window).await;

            let (remaining, reset) = match decision {
                Decision::Limited { retry_after } => {
                    warn!(
                        "Rate limit exceeded for key: {} (count: {}/{})",
                        cache_key, window.count, max_requests
                    );
                    return Ok(req.into_response(
                        create_rate_limit_response(retry_after).map_into_right_body(),
                    ));
                }
                Decision::Allowed {
                    remaining,
                    reset_secs,
                } => (remaining, reset_secs),
            };

            req.extensions_mut().insert(RateLimitInfo {
                remaining,
                limit: max_requests,
                reset,
            });

            // 继续处理请求
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

/// 速率限制信息（可在响应中添加）
#[derive(Clone)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        let import = RateLimit::legacy_import();
        assert_eq!(import.window_secs, 600);
        assert_eq!(RateLimit::new(1, 0).window_secs, 1);
    }

    #[test]
    fn test_fixed_window_limits_then_resets() {
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let (w, d) = FixedWindow::hit(None, start, window, 2);
        assert_eq!(
            d,
            Decision::Allowed {
                remaining: 1,
                reset_secs: 60
            }
        );
        let (w, d) = FixedWindow::hit(Some(w), start + Duration::from_secs(10), window, 2);
        assert!(matches!(d, Decision::Allowed { remaining: 0, .. }));
        let (w, d) = FixedWindow::hit(Some(w), start + Duration::from_secs(20), window, 2);
        assert_eq!(d, Decision::Limited { retry_after: 40 });
        assert_eq!(w.count, 2);

        let (w, d) = FixedWindow::hit(Some(w), start + Duration::from_secs(61), window, 2);
        assert!(matches!(d, Decision::Allowed { remaining: 1, .. }));
        assert_eq!(w.count, 1);
    }
}
