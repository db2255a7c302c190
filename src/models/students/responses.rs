use serde::Serialize;
use ts_rs::TS;

use super::entities::Student;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentListResponse {
    pub items: Vec<Student>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct RosterPreviewResponse {
    pub names: Vec<String>,
    /// 与 names 一一对应的消歧显示名
    pub display_names: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct BulkCreateStudentsResponse {
    pub created: Vec<Student>,
    pub errors: Vec<String>,
}
