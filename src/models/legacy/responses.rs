use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Default, Clone, Serialize, TS)]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyImportCounts {
    pub classrooms: usize,
    pub students: usize,
    pub behaviors: usize,
    pub transactions: usize,
}

/// 导入报告，错误与警告按记录收集
#[derive(Debug, Default, Clone, Serialize, TS)]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyImportReport {
    pub source_version: u32,
    pub dry_run: bool,
    pub created: LegacyImportCounts,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// 旧 id → 新 id
    pub classroom_ids: std::collections::HashMap<String, String>,
    pub last_active_classroom_id: Option<String>,
}
