//! 导入计划
//!
//! 把升级后的数据块转换为待写入记录：所有 id 重新生成，
//! 行为优先匹配已有行为（名称不区分大小写且分值相同）。
//! 找不到班级或学生的流水视为孤立记录。

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::blob::MigratedBlob;
use crate::models::{
    behaviors::entities::Behavior,
    legacy::{
        entities::{
            LegacyImportPlan, PlannedBehavior, PlannedClassroom, PlannedStudent,
            PlannedTransaction,
        },
        responses::{LegacyImportCounts, LegacyImportReport},
    },
};
use crate::utils::validate::{normalize_name, validate_avatar_color, validate_behavior_points};

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: LegacyImportPlan,
    pub report: LegacyImportReport,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn behavior_key(name: &str, points: i32) -> (String, i32) {
    (name.trim().to_lowercase(), points)
}

pub fn build_import_plan(
    migrated: MigratedBlob,
    user_id: &str,
    known_behaviors: &[Behavior],
    block_on_orphans: bool,
) -> Result<PlanOutcome, String> {
    let MigratedBlob {
        blob,
        source_version,
        warnings,
    } = migrated;

    let mut plan = LegacyImportPlan {
        user_id: user_id.to_string(),
        ..Default::default()
    };
    let mut report = LegacyImportReport {
        source_version,
        warnings,
        ..Default::default()
    };

    // 班级与学生
    let mut student_ids: HashMap<String, (String, String)> = HashMap::new();
    for classroom in blob.classrooms {
        if report.classroom_ids.contains_key(&classroom.id) {
            report
                .warnings
                .push(format!("Duplicate classroom id '{}' skipped", classroom.id));
            continue;
        }
        let name = match normalize_name(&classroom.name, "Classroom name") {
            Ok(name) => name,
            Err(e) => {
                report.errors.push(format!("Classroom '{}': {e}", classroom.id));
                continue;
            }
        };
        let classroom_id = new_id();
        report
            .classroom_ids
            .insert(classroom.id.clone(), classroom_id.clone());
        plan.classrooms.push(PlannedClassroom {
            id: classroom_id.clone(),
            name,
        });

        for student in classroom.students {
            if student_ids.contains_key(&student.id) {
                report
                    .warnings
                    .push(format!("Duplicate student id '{}' skipped", student.id));
                continue;
            }
            let name = match normalize_name(&student.name, "Student name") {
                Ok(name) => name,
                Err(e) => {
                    report.errors.push(format!("Student '{}': {e}", student.id));
                    continue;
                }
            };
            let avatar_color = student
                .avatar_color
                .filter(|c| validate_avatar_color(c).is_ok() && !c.is_empty());
            let id = new_id();
            student_ids.insert(student.id.clone(), (id.clone(), classroom.id.clone()));
            plan.students.push(PlannedStudent {
                id,
                classroom_id: classroom_id.clone(),
                name,
                avatar_color,
            });
        }
    }

    // 行为
    let known: HashMap<(String, i32), &Behavior> = known_behaviors
        .iter()
        .filter(|b| b.visible_to(user_id))
        .map(|b| (behavior_key(&b.name, b.points), b))
        .collect();
    let mut behavior_ids: HashMap<String, String> = HashMap::new();
    let mut planned_keys: HashMap<(String, i32), String> = HashMap::new();
    for behavior in blob.behaviors {
        let key = behavior_key(&behavior.name, behavior.points);
        if let Some(existing) = known.get(&key) {
            behavior_ids.insert(behavior.id, existing.id.clone());
            continue;
        }
        if let Some(planned) = planned_keys.get(&key) {
            behavior_ids.insert(behavior.id, planned.clone());
            continue;
        }

        let name = match normalize_name(&behavior.name, "Behavior name") {
            Ok(name) => name,
            Err(e) => {
                report.errors.push(format!("Behavior '{}': {e}", behavior.id));
                continue;
            }
        };
        let hinted = behavior.category.as_deref().and_then(|c| c.parse().ok());
        let category = match validate_behavior_points(behavior.points, hinted) {
            Ok(category) => category,
            Err(e) => {
                report.errors.push(format!("Behavior '{}': {e}", behavior.id));
                continue;
            }
        };

        let id = new_id();
        planned_keys.insert(key, id.clone());
        behavior_ids.insert(behavior.id, id.clone());
        plan.behaviors.push(PlannedBehavior {
            id,
            name,
            points: behavior.points,
            icon: behavior.icon,
            category,
        });
    }

    // 流水
    let mut orphans = 0usize;
    let mut seen: HashSet<String> = HashSet::new();
    for tx in blob.transactions {
        if !seen.insert(tx.id.clone()) {
            report
                .warnings
                .push(format!("Duplicate transaction id '{}' skipped", tx.id));
            continue;
        }
        let target = student_ids
            .get(&tx.student_id)
            .filter(|(_, legacy_classroom)| *legacy_classroom == tx.classroom_id)
            .and_then(|(student_id, legacy_classroom)| {
                report
                    .classroom_ids
                    .get(legacy_classroom)
                    .map(|classroom_id| (student_id.clone(), classroom_id.clone()))
            });
        let Some((student_id, classroom_id)) = target else {
            orphans += 1;
            report.warnings.push(format!(
                "Transaction '{}' references unknown student '{}' in classroom '{}'",
                tx.id, tx.student_id, tx.classroom_id
            ));
            continue;
        };

        plan.transactions.push(PlannedTransaction {
            id: new_id(),
            student_id,
            classroom_id,
            behavior_id: tx
                .behavior_id
                .as_ref()
                .and_then(|id| behavior_ids.get(id))
                .cloned(),
            behavior_name: tx.behavior_name,
            behavior_icon: tx.behavior_icon,
            points: tx.points,
            note: tx.note.filter(|n| !n.trim().is_empty()),
            created_at_ms: tx.timestamp,
        });
    }

    if orphans > 0 {
        warn!("Legacy import found {} orphaned transactions", orphans);
        if block_on_orphans {
            return Err(format!(
                "Import aborted: {orphans} transactions reference missing students or classrooms"
            ));
        }
    }

    report.last_active_classroom_id = blob
        .last_active_classroom_id
        .and_then(|old| report.classroom_ids.get(&old).cloned());
    report.created = LegacyImportCounts {
        classrooms: plan.classrooms.len(),
        students: plan.students.len(),
        behaviors: plan.behaviors.len(),
        transactions: plan.transactions.len(),
    };

    Ok(PlanOutcome { plan, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::behaviors::entities::BehaviorCategory;
    use crate::services::legacy::blob::migrate_blob;
    use serde_json::json;

    fn global_behavior(name: &str, points: i32) -> Behavior {
        Behavior {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            name: name.to_string(),
            points,
            icon: "⭐".to_string(),
            category: BehaviorCategory::for_points(points),
            is_custom: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn sample() -> MigratedBlob {
        migrate_blob(json!({
            "version": 2,
            "classrooms": [
                {"id": "c1", "name": "  Room 1 ", "students": [
                    {"id": "s1", "name": "Ann", "avatarColor": "#AABBCC"},
                    {"id": "s2", "name": "Ben", "avatarColor": "red"}
                ]}
            ],
            "behaviors": [
                {"id": "b1", "name": "on task", "points": 1},
                {"id": "b2", "name": "Helping", "points": 3, "isCustom": true},
                {"id": "b3", "name": "Broken", "points": 0}
            ],
            "transactions": [
                {"id": "t1", "studentId": "s1", "classroomId": "c1", "behaviorId": "b1",
                 "behaviorName": "On Task", "points": 1, "timestamp": 1700000000000i64},
                {"id": "t2", "studentId": "s2", "classroomId": "c1", "behaviorId": "b2",
                 "behaviorName": "Helping", "points": 3, "timestamp": 1700000001000i64},
                {"id": "t3", "studentId": "gone", "classroomId": "c1",
                 "behaviorName": "Helping", "points": 3, "timestamp": 1700000002000i64}
            ],
            "lastActiveClassroomId": "c1"
        }))
        .unwrap()
    }

    #[test]
    fn test_plan_remaps_and_reuses_behaviors() {
        let on_task = global_behavior("On Task", 1);
        let outcome = build_import_plan(sample(), "u1", &[on_task.clone()], false).unwrap();
        let PlanOutcome { plan, report } = outcome;

        assert_eq!(plan.classrooms.len(), 1);
        assert_eq!(plan.classrooms[0].name, "Room 1");
        let classroom_id = &plan.classrooms[0].id;
        assert_eq!(report.classroom_ids.get("c1"), Some(classroom_id));
        assert_eq!(report.last_active_classroom_id.as_ref(), Some(classroom_id));

        assert_eq!(plan.students[0].avatar_color.as_deref(), Some("#AABBCC"));
        assert_eq!(plan.students[1].avatar_color, None);

        // b1 匹配全局行为，b2 新建，b3 分值为 0 报错
        assert_eq!(plan.behaviors.len(), 1);
        assert_eq!(plan.behaviors[0].name, "Helping");
        assert_eq!(report.errors.len(), 1);

        assert_eq!(plan.transactions.len(), 2);
        assert_eq!(plan.transactions[0].behavior_id.as_ref(), Some(&on_task.id));
        assert_eq!(
            plan.transactions[1].behavior_id.as_ref(),
            Some(&plan.behaviors[0].id)
        );
        assert!(plan.transactions.iter().all(|t| &t.classroom_id == classroom_id));
        assert_eq!(report.created.transactions, 2);
        assert!(report.warnings.iter().any(|w| w.contains("'t3'")));
    }

    #[test]
    fn test_orphans_can_block() {
        let err = build_import_plan(sample(), "u1", &[], true).unwrap_err();
        assert!(err.contains("1 transactions"));
    }
}
