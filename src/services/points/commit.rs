//! 积分写入流程
//!
//! 先乐观更新实时汇总，再在单个数据库事务中写入，最后发布变更事件。
//! 写入失败时不回滚本地增量，而是把班级标记为过期。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::{LiveTotals, TotalsDelta};
use crate::errors::Result;
use crate::models::{
    PeriodWindow, PointTotals,
    classrooms::entities::Classroom,
    realtime::entities::{ChangeKind, ChangeTable},
    students::entities::Student,
    transactions::entities::{NewTransaction, PointTransaction, PointsWriteOutcome},
};
use crate::services::realtime::RealtimeHub;
use crate::storage::Storage;

fn rewind_student(student: &Student, delta: PointTotals) -> Student {
    let mut old = student.clone();
    old.point_total -= delta.total;
    old.positive_total -= delta.positive;
    old.negative_total -= delta.negative;
    old.today_total -= delta.today;
    old.this_week_total -= delta.this_week;
    old
}

fn rewind_classroom(classroom: &Classroom, delta: PointTotals) -> Classroom {
    let mut old = classroom.clone();
    old.point_total -= delta.total;
    old.positive_total -= delta.positive;
    old.negative_total -= delta.negative;
    old
}

fn publish_outcome(
    hub: &RealtimeHub,
    owner_id: &str,
    outcome: &PointsWriteOutcome,
    deltas: &HashMap<String, TotalsDelta>,
    transaction_kind: ChangeKind,
) {
    let classroom_id = outcome.classroom.id.as_str();

    for student in &outcome.students {
        let delta = deltas.get(&student.id).copied().unwrap_or_default().totals();
        hub.publish_row(
            ChangeTable::Students,
            ChangeKind::Update,
            Some(owner_id),
            Some(classroom_id),
            Some(student),
            Some(&rewind_student(student, delta)),
        );
    }

    for tx in &outcome.transactions {
        let (new, old) = match transaction_kind {
            ChangeKind::Delete => (None, Some(tx)),
            _ => (Some(tx), None),
        };
        hub.publish_row(
            ChangeTable::PointTransactions,
            transaction_kind,
            Some(owner_id),
            Some(classroom_id),
            new,
            old,
        );
    }

    let total_delta = deltas.values().copied().sum::<TotalsDelta>().totals();
    hub.publish_row(
        ChangeTable::Classrooms,
        ChangeKind::Update,
        Some(owner_id),
        Some(classroom_id),
        Some(&outcome.classroom),
        Some(&rewind_classroom(&outcome.classroom, total_delta)),
    );
}

fn collect_deltas<'a>(
    items: impl Iterator<Item = (&'a str, TotalsDelta)>,
) -> HashMap<String, TotalsDelta> {
    let mut deltas: HashMap<String, TotalsDelta> = HashMap::new();
    for (student_id, delta) in items {
        let entry = deltas.entry(student_id.to_string()).or_default();
        *entry = *entry + delta;
    }
    deltas
}

/// 奖励积分
pub async fn commit_award(
    storage: &Arc<dyn Storage>,
    live: &LiveTotals,
    hub: &RealtimeHub,
    owner_id: &str,
    classroom_id: &str,
    transactions: Vec<NewTransaction>,
    window: PeriodWindow,
) -> Result<PointsWriteOutcome> {
    let deltas = collect_deltas(transactions.iter().map(|tx| {
        (
            tx.student_id.as_str(),
            TotalsDelta::award(tx.points, tx.created_at.timestamp_millis(), &window),
        )
    }));
    for (student_id, delta) in &deltas {
        live.apply_optimistic(student_id, classroom_id, delta);
    }

    match storage.award_points(classroom_id, transactions, window).await {
        Ok(outcome) => {
            publish_outcome(hub, owner_id, &outcome, &deltas, ChangeKind::Insert);
            Ok(outcome)
        }
        Err(e) => {
            warn!("Award write failed for classroom {}: {}", classroom_id, e);
            live.mark_stale(classroom_id);
            Err(e)
        }
    }
}

/// 撤销流水，增量为原奖励的相反数
pub async fn commit_undo(
    storage: &Arc<dyn Storage>,
    live: &LiveTotals,
    hub: &RealtimeHub,
    owner_id: &str,
    classroom_id: &str,
    transactions: &[PointTransaction],
    window: PeriodWindow,
) -> Result<PointsWriteOutcome> {
    let deltas = collect_deltas(transactions.iter().map(|tx| {
        (
            tx.student_id.as_str(),
            TotalsDelta::undo(tx.points, tx.created_at.timestamp_millis(), &window),
        )
    }));
    for (student_id, delta) in &deltas {
        live.apply_optimistic(student_id, classroom_id, delta);
    }

    let ids: Vec<String> = transactions.iter().map(|tx| tx.id.clone()).collect();
    match storage.undo_transactions(classroom_id, &ids, window).await {
        Ok(outcome) => {
            publish_outcome(hub, owner_id, &outcome, &deltas, ChangeKind::Delete);
            Ok(outcome)
        }
        Err(e) => {
            warn!("Undo write failed for classroom {}: {}", classroom_id, e);
            live.mark_stale(classroom_id);
            Err(e)
        }
    }
}

/// 从存储重新加载班级视图
pub async fn resync_classroom(
    storage: &Arc<dyn Storage>,
    live: &LiveTotals,
    classroom_id: &str,
    window: PeriodWindow,
) -> Result<bool> {
    let Some(classroom) = storage.get_classroom(classroom_id).await? else {
        live.evict(classroom_id);
        return Ok(false);
    };
    let students = storage.list_students(classroom_id, window).await?;
    live.load_classroom(&classroom, &students);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RealtimeConfig;
    use crate::storage::sea_orm_storage::test_support::classroom_with_students;

    fn award_for(student_id: &str, points: i32) -> NewTransaction {
        NewTransaction {
            student_id: student_id.to_string(),
            behavior_id: None,
            behavior_name: "Helping".to_string(),
            behavior_icon: "🤝".to_string(),
            points,
            note: None,
            batch_id: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_award_then_undo_restores_totals() {
        let (storage, user_id, classroom_id, student_ids) =
            classroom_with_students(&["Ann"]).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let window = PeriodWindow::containing(chrono::Utc::now(), 0);
        let student_id = student_ids[0].clone();

        let live = LiveTotals::new();
        resync_classroom(&storage, &live, &classroom_id, window).await.unwrap();
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        let mut rx = hub.subscribe();

        let outcome = commit_award(
            &storage,
            &live,
            &hub,
            &user_id,
            &classroom_id,
            vec![award_for(&student_id, 3)],
            window,
        )
        .await
        .unwrap();
        assert_eq!(outcome.classroom.point_total, 3);
        assert_eq!(live.classroom_totals(&classroom_id).unwrap().total, 3);

        // 自己写入的确认事件抵消为 0
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            live.apply_event(&event);
        }
        assert_eq!(live.classroom_totals(&classroom_id).unwrap().total, 3);
        assert!(!live.needs_resync(&classroom_id));

        let undone = commit_undo(
            &storage,
            &live,
            &hub,
            &user_id,
            &classroom_id,
            &outcome.transactions,
            window,
        )
        .await
        .unwrap();
        assert_eq!(undone.classroom.point_total, 0);
        assert_eq!(undone.students[0].point_total, 0);
        assert_eq!(live.classroom_totals(&classroom_id).unwrap(), PointTotals::default());
    }
}
