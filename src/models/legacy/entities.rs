//! 旧版本地存储数据结构
//!
//! 字段命名沿用旧客户端的 camelCase。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 本地存储中的键名
pub const LEGACY_STORAGE_KEY: &str = "classroom-points-data";

/// 当前数据版本
pub const LEGACY_CURRENT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyStudent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyClassroom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub students: Vec<LegacyStudent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyBehavior {
    pub id: String,
    pub name: String,
    pub points: i32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyTransaction {
    pub id: String,
    pub student_id: String,
    pub classroom_id: String,
    #[serde(default)]
    pub behavior_id: Option<String>,
    pub behavior_name: String,
    #[serde(default)]
    pub behavior_icon: String,
    pub points: i32,
    #[serde(default)]
    pub note: Option<String>,
    /// 毫秒时间戳
    pub timestamp: i64,
}

/// 版本 2 数据块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyBlob {
    pub version: u32,
    pub classrooms: Vec<LegacyClassroom>,
    pub behaviors: Vec<LegacyBehavior>,
    pub transactions: Vec<LegacyTransaction>,
    #[serde(default)]
    pub last_active_classroom_id: Option<String>,
}

/// 导入计划：已完成 id 重映射的待写入记录
#[derive(Debug, Clone, Default)]
pub struct LegacyImportPlan {
    pub user_id: String,
    pub classrooms: Vec<PlannedClassroom>,
    pub students: Vec<PlannedStudent>,
    pub behaviors: Vec<PlannedBehavior>,
    pub transactions: Vec<PlannedTransaction>,
}

#[derive(Debug, Clone)]
pub struct PlannedClassroom {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PlannedStudent {
    pub id: String,
    pub classroom_id: String,
    pub name: String,
    pub avatar_color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlannedBehavior {
    pub id: String,
    pub name: String,
    pub points: i32,
    pub icon: String,
    pub category: crate::models::behaviors::entities::BehaviorCategory,
}

#[derive(Debug, Clone)]
pub struct PlannedTransaction {
    pub id: String,
    pub student_id: String,
    pub classroom_id: String,
    pub behavior_id: Option<String>,
    pub behavior_name: String,
    pub behavior_icon: String,
    pub points: i32,
    pub note: Option<String>,
    pub created_at_ms: i64,
}
