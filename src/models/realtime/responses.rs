use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "realtime.ts")]
pub struct RealtimeStats {
    pub connections: usize,
    pub subscriptions: usize,
}
