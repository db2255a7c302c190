use serde::Serialize;
use ts_rs::TS;

use super::entities::SyncStatus;
use crate::models::realtime::responses::RealtimeStats;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SystemStatusResponse {
    pub system_name: String,
    pub version: String,
    pub environment: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
    pub sync_status: SyncStatus,
    pub pending_writes: usize,
    pub realtime: RealtimeStats,
}
