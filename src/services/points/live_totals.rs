//! 实时积分汇总
//!
//! 每个已加载班级维护一份班级汇总和每名学生的影子汇总。
//! 写入请求先调用 [`LiveTotals::apply_optimistic`]，变更流中的学生快照再经
//! [`LiveTotals::reconcile_from_remote`] 对账。缺少完整行镜像时无法对账，
//! 对应班级被标记为过期，由调用方从存储重新同步。

use dashmap::DashMap;
use tracing::debug;

use super::reconcile::{TotalsDelta, reconcile};
use crate::models::PointTotals;
use crate::models::classrooms::entities::Classroom;
use crate::models::classrooms::responses::StudentLiveTotals;
use crate::models::realtime::entities::{ChangeEvent, ChangeKind, ChangeTable};
use crate::models::students::entities::Student;

#[derive(Debug, Clone)]
struct StudentShadow {
    classroom_id: String,
    totals: PointTotals,
}

#[derive(Debug, Clone, Default)]
struct ClassroomView {
    totals: PointTotals,
    stale: bool,
}

/// 变更事件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// 已对账，附带班级修正量
    Applied(PointTotals),
    /// 需要从存储重新同步该班级
    NeedsResync(String),
    Ignored,
}

#[derive(Default)]
pub struct LiveTotals {
    students: DashMap<String, StudentShadow>,
    classrooms: DashMap<String, ClassroomView>,
}

impl LiveTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以存储中的行替换班级视图
    pub fn load_classroom(&self, classroom: &Classroom, students: &[Student]) {
        self.students
            .retain(|_, shadow| shadow.classroom_id != classroom.id);

        let mut totals = PointTotals::default();
        for student in students {
            let student_totals = student.totals();
            totals += student_totals;
            self.students.insert(
                student.id.clone(),
                StudentShadow {
                    classroom_id: classroom.id.clone(),
                    totals: student_totals,
                },
            );
        }

        if totals.total != classroom.point_total {
            debug!(
                "Classroom {} stored total {} differs from student sum {}",
                classroom.id, classroom.point_total, totals.total
            );
        }

        self.classrooms.insert(
            classroom.id.clone(),
            ClassroomView {
                totals,
                stale: false,
            },
        );
    }

    pub fn evict(&self, classroom_id: &str) {
        self.classrooms.remove(classroom_id);
        self.students
            .retain(|_, shadow| shadow.classroom_id != classroom_id);
    }

    pub fn is_loaded(&self, classroom_id: &str) -> bool {
        self.classrooms.contains_key(classroom_id)
    }

    /// 未加载或已过期的班级在读取前需要重新同步
    pub fn needs_resync(&self, classroom_id: &str) -> bool {
        self.classrooms
            .get(classroom_id)
            .is_none_or(|view| view.stale)
    }

    pub fn mark_stale(&self, classroom_id: &str) {
        if let Some(mut view) = self.classrooms.get_mut(classroom_id) {
            view.stale = true;
        }
    }

    /// 变更流丢失事件后，所有班级都需重新同步
    pub fn mark_all_stale(&self) {
        for mut view in self.classrooms.iter_mut() {
            view.stale = true;
        }
    }

    /// 已过期的班级
    pub fn stale_classrooms(&self) -> Vec<String> {
        self.classrooms
            .iter()
            .filter(|entry| entry.stale)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// 乐观地把增量计入学生与班级，班级未加载时忽略
    pub fn apply_optimistic(&self, student_id: &str, classroom_id: &str, delta: &TotalsDelta) {
        if delta.is_zero() {
            return;
        }
        let Some(mut view) = self.classrooms.get_mut(classroom_id) else {
            return;
        };
        view.totals += delta.totals();

        self.students
            .entry(student_id.to_string())
            .and_modify(|shadow| shadow.totals += delta.totals())
            .or_insert_with(|| StudentShadow {
                classroom_id: classroom_id.to_string(),
                totals: delta.totals(),
            });
    }

    /// 用存储端的学生快照对账，返回叠加到班级上的修正量
    pub fn reconcile_from_remote(&self, snapshot: &Student) -> Option<PointTotals> {
        let mut view = self.classrooms.get_mut(&snapshot.classroom_id)?;

        let local = self
            .students
            .get(&snapshot.id)
            .map(|shadow| shadow.totals)
            .unwrap_or_default();
        let result = reconcile(&local, &snapshot.totals());

        view.totals += result.classroom_delta;
        self.students.insert(
            snapshot.id.clone(),
            StudentShadow {
                classroom_id: snapshot.classroom_id.clone(),
                totals: result.merged,
            },
        );
        Some(result.classroom_delta)
    }

    /// 学生被删除时从班级汇总中扣除其影子汇总
    pub fn remove_student(&self, student_id: &str) -> Option<PointTotals> {
        let (_, shadow) = self.students.remove(student_id)?;
        if let Some(mut view) = self.classrooms.get_mut(&shadow.classroom_id) {
            view.totals += -shadow.totals;
        }
        Some(-shadow.totals)
    }

    pub fn classroom_totals(&self, classroom_id: &str) -> Option<PointTotals> {
        self.classrooms.get(classroom_id).map(|view| view.totals)
    }

    pub fn student_totals(&self, student_id: &str) -> Option<PointTotals> {
        self.students.get(student_id).map(|shadow| shadow.totals)
    }

    /// 班级汇总及其学生汇总（按学生 ID 排序）
    pub fn snapshot(&self, classroom_id: &str) -> Option<(PointTotals, Vec<StudentLiveTotals>)> {
        let totals = self.classroom_totals(classroom_id)?;
        let mut students: Vec<StudentLiveTotals> = self
            .students
            .iter()
            .filter(|entry| entry.classroom_id == classroom_id)
            .map(|entry| StudentLiveTotals {
                student_id: entry.key().clone(),
                totals: entry.totals,
            })
            .collect();
        students.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Some((totals, students))
    }

    /// 处理一条变更事件
    pub fn apply_event(&self, event: &ChangeEvent) -> EventOutcome {
        let Some(classroom_id) = event.classroom_id.as_deref() else {
            return EventOutcome::Ignored;
        };
        if !self.is_loaded(classroom_id) {
            return EventOutcome::Ignored;
        }

        match (event.table, event.event) {
            (ChangeTable::Students, ChangeKind::Delete | ChangeKind::Update)
                if event.has_key_only_old() =>
            {
                self.mark_stale(classroom_id);
                EventOutcome::NeedsResync(classroom_id.to_string())
            }
            (ChangeTable::Students, ChangeKind::Insert | ChangeKind::Update) => {
                match event
                    .new
                    .clone()
                    .and_then(|row| serde_json::from_value::<Student>(row).ok())
                {
                    Some(student) => self
                        .reconcile_from_remote(&student)
                        .map_or(EventOutcome::Ignored, EventOutcome::Applied),
                    None => {
                        self.mark_stale(classroom_id);
                        EventOutcome::NeedsResync(classroom_id.to_string())
                    }
                }
            }
            (ChangeTable::Students, ChangeKind::Delete) => {
                let student_id = event
                    .old
                    .as_ref()
                    .and_then(|old| old.get("id"))
                    .and_then(|id| id.as_str());
                match student_id.and_then(|id| self.remove_student(id)) {
                    Some(delta) => EventOutcome::Applied(delta),
                    None => EventOutcome::Ignored,
                }
            }
            (ChangeTable::Classrooms, ChangeKind::Delete) => {
                self.evict(classroom_id);
                EventOutcome::Ignored
            }
            (ChangeTable::Classrooms, ChangeKind::Update) => {
                // 班级行只保存累计值，与本地不一致说明漏掉了学生事件
                let stored = event
                    .new
                    .clone()
                    .and_then(|row| serde_json::from_value::<Classroom>(row).ok());
                match (stored, self.classroom_totals(classroom_id)) {
                    (Some(classroom), Some(local))
                        if classroom.point_total != local.total
                            || classroom.positive_total != local.positive
                            || classroom.negative_total != local.negative =>
                    {
                        self.mark_stale(classroom_id);
                        EventOutcome::NeedsResync(classroom_id.to_string())
                    }
                    _ => EventOutcome::Ignored,
                }
            }
            _ => EventOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodWindow;

    fn classroom(id: &str, total: i64) -> Classroom {
        Classroom {
            id: id.to_string(),
            user_id: "teacher".to_string(),
            name: "Room".to_string(),
            point_total: total,
            positive_total: total.max(0),
            negative_total: total.min(0),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn student(id: &str, classroom_id: &str, total: i64) -> Student {
        Student {
            id: id.to_string(),
            classroom_id: classroom_id.to_string(),
            name: id.to_string(),
            avatar_color: None,
            point_total: total,
            positive_total: total.max(0),
            negative_total: total.min(0),
            today_total: total,
            this_week_total: total,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn now() -> (PeriodWindow, i64) {
        let now = chrono::Utc::now();
        (PeriodWindow::containing(now, 0), now.timestamp_millis())
    }

    fn student_event(kind: ChangeKind, row: &Student, key_only_old: bool) -> ChangeEvent {
        let full = serde_json::to_value(row).unwrap();
        let old = if key_only_old {
            serde_json::json!({ "id": row.id })
        } else {
            full.clone()
        };
        ChangeEvent {
            table: ChangeTable::Students,
            event: kind,
            owner_id: None,
            classroom_id: Some(row.classroom_id.clone()),
            new: (kind != ChangeKind::Delete).then_some(full),
            old: (kind != ChangeKind::Insert).then_some(old),
            commit_timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_optimistic_then_confirm_applies_once() {
        let live = LiveTotals::new();
        live.load_classroom(&classroom("c1", 5), &[student("s1", "c1", 5)]);
        let (window, at) = now();

        let delta = TotalsDelta::award(3, at, &window);
        live.apply_optimistic("s1", "c1", &delta);
        assert_eq!(live.classroom_totals("c1").unwrap().total, 8);

        let confirmed = student("s1", "c1", 8);
        let outcome = live.apply_event(&student_event(ChangeKind::Update, &confirmed, false));
        assert_eq!(outcome, EventOutcome::Applied(PointTotals::default()));
        assert_eq!(live.classroom_totals("c1").unwrap().total, 8);
        assert_eq!(live.student_totals("s1").unwrap().total, 8);
    }

    #[test]
    fn test_foreign_update_applies_full_delta() {
        let live = LiveTotals::new();
        live.load_classroom(
            &classroom("c1", 3),
            &[student("s1", "c1", 1), student("s2", "c1", 2)],
        );

        live.apply_event(&student_event(ChangeKind::Update, &student("s2", "c1", -1), false));
        assert_eq!(live.classroom_totals("c1").unwrap().total, 0);
    }

    #[test]
    fn test_key_only_old_requires_resync() {
        let live = LiveTotals::new();
        live.load_classroom(&classroom("c1", 1), &[student("s1", "c1", 1)]);

        let outcome = live.apply_event(&student_event(ChangeKind::Delete, &student("s1", "c1", 1), true));
        assert_eq!(outcome, EventOutcome::NeedsResync("c1".to_string()));
        assert!(live.needs_resync("c1"));

        live.load_classroom(&classroom("c1", 0), &[]);
        assert!(!live.needs_resync("c1"));
        assert_eq!(live.classroom_totals("c1").unwrap(), PointTotals::default());
    }

    #[test]
    fn test_full_delete_subtracts_student() {
        let live = LiveTotals::new();
        live.load_classroom(
            &classroom("c1", 7),
            &[student("s1", "c1", 4), student("s2", "c1", 3)],
        );

        live.apply_event(&student_event(ChangeKind::Delete, &student("s1", "c1", 4), false));
        assert_eq!(live.classroom_totals("c1").unwrap().total, 3);
        assert!(live.student_totals("s1").is_none());
    }

    #[test]
    fn test_events_for_unloaded_classroom_are_ignored() {
        let live = LiveTotals::new();
        let outcome = live.apply_event(&student_event(ChangeKind::Update, &student("s1", "c9", 4), false));
        assert_eq!(outcome, EventOutcome::Ignored);
        assert!(live.needs_resync("c9"));
    }

    #[test]
    fn test_classroom_mismatch_marks_stale() {
        let live = LiveTotals::new();
        live.load_classroom(&classroom("c1", 2), &[student("s1", "c1", 2)]);
        let event = ChangeEvent {
            table: ChangeTable::Classrooms,
            event: ChangeKind::Update,
            owner_id: None,
            classroom_id: Some("c1".to_string()),
            new: Some(serde_json::to_value(classroom("c1", 9)).unwrap()),
            old: None,
            commit_timestamp: chrono::Utc::now(),
        };
        assert_eq!(live.apply_event(&event), EventOutcome::NeedsResync("c1".to_string()));
    }
}
