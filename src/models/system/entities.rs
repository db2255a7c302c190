use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "system.ts")]
pub enum SyncStatus {
    Online,
    Offline,
    Syncing,
}
