//! 旧版本地存储数据块的识别与升级
//!
//! 接受三种输入：数据块对象本身、数据块的 JSON 字符串、
//! 或以 `classroom-points-data` 为键的本地存储导出。
//! 版本 1 的流水没有 classroomId，按学生所在班级补齐；
//! 无法识别的记录被丢弃并记录警告。

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::legacy::entities::{
    LEGACY_CURRENT_VERSION, LEGACY_STORAGE_KEY, LegacyBehavior, LegacyBlob, LegacyClassroom,
    LegacyTransaction,
};

/// 升级后的数据块
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedBlob {
    pub blob: LegacyBlob,
    pub source_version: u32,
    pub warnings: Vec<String>,
}

fn unwrap_storage_value(raw: Value) -> Result<Map<String, Value>, String> {
    match raw {
        Value::String(text) => {
            let inner: Value = serde_json::from_str(&text)
                .map_err(|e| format!("Legacy data is not valid JSON: {e}"))?;
            unwrap_storage_value(inner)
        }
        Value::Object(mut map) => match map.remove(LEGACY_STORAGE_KEY) {
            Some(inner) => unwrap_storage_value(inner),
            None => Ok(map),
        },
        _ => Err("Legacy data must be a JSON object".to_string()),
    }
}

fn read_version(map: &Map<String, Value>) -> Result<u32, String> {
    match map.get("version") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("Invalid legacy data version: {v}")),
    }
}

fn take_array(map: &mut Map<String, Value>, key: &str, warnings: &mut Vec<String>) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            warnings.push(format!("Discarded '{key}': expected an array"));
            Vec::new()
        }
    }
}

fn parse_records<T: DeserializeOwned>(items: Vec<Value>, kind: &str, warnings: &mut Vec<String>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warnings.push(format!("Discarded {kind} #{}: {e}", index + 1));
                None
            }
        })
        .collect()
}

/// 版本 1 的流水补上 classroomId，找不到学生时留空交由导入阶段按孤立记录处理
fn fill_classroom_ids(transactions: &mut [Value], classrooms: &[LegacyClassroom]) {
    let owner: HashMap<&str, &str> = classrooms
        .iter()
        .flat_map(|c| c.students.iter().map(move |s| (s.id.as_str(), c.id.as_str())))
        .collect();

    for tx in transactions.iter_mut() {
        let Value::Object(obj) = tx else { continue };
        if obj.get("classroomId").is_some_and(Value::is_string) {
            continue;
        }
        let classroom_id = obj
            .get("studentId")
            .and_then(Value::as_str)
            .and_then(|sid| owner.get(sid))
            .map(|cid| cid.to_string())
            .unwrap_or_default();
        obj.insert("classroomId".to_string(), Value::String(classroom_id));
    }
}

pub fn migrate_blob(raw: Value) -> Result<MigratedBlob, String> {
    let mut map = unwrap_storage_value(raw)?;
    let source_version = read_version(&map)?;
    if source_version > LEGACY_CURRENT_VERSION {
        return Err(format!(
            "Unsupported legacy data version {source_version} (newest known is {LEGACY_CURRENT_VERSION})"
        ));
    }

    let mut warnings = Vec::new();
    let classrooms: Vec<LegacyClassroom> = parse_records(
        take_array(&mut map, "classrooms", &mut warnings),
        "classroom",
        &mut warnings,
    );
    let behaviors: Vec<LegacyBehavior> = parse_records(
        take_array(&mut map, "behaviors", &mut warnings),
        "behavior",
        &mut warnings,
    );

    let mut raw_transactions = take_array(&mut map, "transactions", &mut warnings);
    if source_version < 2 {
        fill_classroom_ids(&mut raw_transactions, &classrooms);
    }
    let transactions: Vec<LegacyTransaction> =
        parse_records(raw_transactions, "transaction", &mut warnings);

    let last_active_classroom_id = map
        .get("lastActiveClassroomId")
        .and_then(Value::as_str)
        .map(str::to_string);

    if classrooms.is_empty() && behaviors.is_empty() && transactions.is_empty() {
        return Err("Legacy data contains no classrooms, behaviors or transactions".to_string());
    }

    Ok(MigratedBlob {
        blob: LegacyBlob {
            version: LEGACY_CURRENT_VERSION,
            classrooms,
            behaviors,
            transactions,
            last_active_classroom_id,
        },
        source_version,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v1_blob() -> Value {
        json!({
            "classrooms": [
                {"id": "c1", "name": "Room 1", "students": [{"id": "s1", "name": "Ann"}]},
                {"name": "missing id"}
            ],
            "behaviors": [{"id": "b1", "name": "Helping", "points": 2, "icon": "🤝", "isCustom": true}],
            "transactions": [
                {"id": "t1", "studentId": "s1", "behaviorName": "Helping", "points": 2, "timestamp": 1700000000000i64},
                {"id": "t2", "studentId": "ghost", "behaviorName": "Helping", "points": 2, "timestamp": 1700000000001i64}
            ]
        })
    }

    #[test]
    fn test_v1_upgrade_derives_classroom() {
        let migrated = migrate_blob(v1_blob()).unwrap();
        assert_eq!(migrated.source_version, 1);
        assert_eq!(migrated.blob.version, LEGACY_CURRENT_VERSION);
        assert_eq!(migrated.blob.classrooms.len(), 1);
        assert_eq!(migrated.warnings.len(), 1);
        assert_eq!(migrated.blob.transactions[0].classroom_id, "c1");
        assert_eq!(migrated.blob.transactions[1].classroom_id, "");
    }

    #[test]
    fn test_storage_wrapper_and_string_forms() {
        let text = serde_json::to_string(&v1_blob()).unwrap();
        let wrapped = json!({ LEGACY_STORAGE_KEY: text });
        let migrated = migrate_blob(wrapped).unwrap();
        assert_eq!(migrated.blob.classrooms[0].students[0].name, "Ann");
    }

    #[test]
    fn test_v2_kept_and_future_rejected() {
        let v2 = json!({
            "version": 2,
            "classrooms": [{"id": "c1", "name": "Room", "students": []}],
            "behaviors": [],
            "transactions": [],
            "lastActiveClassroomId": "c1"
        });
        let migrated = migrate_blob(v2).unwrap();
        assert_eq!(migrated.source_version, 2);
        assert_eq!(migrated.blob.last_active_classroom_id.as_deref(), Some("c1"));

        assert!(migrate_blob(json!({"version": 9, "classrooms": []})).is_err());
        assert!(migrate_blob(json!([1, 2, 3])).is_err());
        assert!(migrate_blob(json!({"unrelated": true})).is_err());
    }
}
