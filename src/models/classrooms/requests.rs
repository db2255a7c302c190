use serde::Deserialize;
use ts_rs::TS;

use super::entities::LeaderboardCategory;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct CreateClassroomRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct UpdateClassroomRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "classroom.ts")]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub category: LeaderboardCategory,
    pub limit: Option<usize>,
}
