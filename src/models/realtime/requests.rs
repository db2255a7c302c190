use serde::Deserialize;

/// WebSocket 握手查询参数（浏览器无法设置 Authorization 头）
#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    pub token: Option<String>,
}
