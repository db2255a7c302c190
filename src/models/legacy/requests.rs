use serde::Deserialize;
use ts_rs::TS;

/// 旧版导入请求，`data` 为本地存储中的原始 JSON 值
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "legacy.ts")]
pub struct LegacyImportRequest {
    #[ts(type = "unknown")]
    pub data: serde_json::Value,
    /// 为 true 时仅校验并返回报告，不写入数据库
    #[serde(default)]
    pub dry_run: bool,
}
