use serde::Serialize;
use ts_rs::TS;

use super::entities::Behavior;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "behavior.ts")]
pub struct BehaviorListResponse {
    pub positive: Vec<Behavior>,
    pub negative: Vec<Behavior>,
}
