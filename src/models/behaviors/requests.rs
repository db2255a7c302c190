use serde::Deserialize;
use ts_rs::TS;

use super::entities::BehaviorCategory;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "behavior.ts")]
pub struct CreateBehaviorRequest {
    pub name: String,
    pub points: i32,
    pub icon: String,
    /// 省略时由分值符号推断
    pub category: Option<BehaviorCategory>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "behavior.ts")]
pub struct UpdateBehaviorRequest {
    pub name: Option<String>,
    pub points: Option<i32>,
    pub icon: Option<String>,
    pub category: Option<BehaviorCategory>,
}
