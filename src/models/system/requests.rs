use serde::Deserialize;
use ts_rs::TS;

/// 管理员手动切换在线状态（用于演练离线队列）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SetOnlineRequest {
    pub online: bool,
}
