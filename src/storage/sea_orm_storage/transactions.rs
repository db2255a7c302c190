//! 积分流水存储操作
//!
//! 奖励与撤销在同一个数据库事务中写入流水并增量维护学生、班级的冗余汇总，
//! 保证学生累计积分之和始终等于班级累计积分。

use std::collections::HashMap;

use super::students::{period_sums_in, with_periods};
use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::classrooms::{self, Entity as Classrooms};
use crate::entity::point_transactions::{ActiveModel, Column, Entity as PointTransactions};
use crate::entity::students::{self, Entity as Students};
use crate::errors::{ClassPointsError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, PeriodWindow,
    transactions::entities::{NewTransaction, PointTransaction, PointsWriteOutcome},
};
use sea_orm::sea_query::{Expr, IntoColumnRef};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 累计值变化 (total, positive, negative)
#[derive(Debug, Clone, Copy, Default)]
struct StoredDelta(i64, i64, i64);

impl StoredDelta {
    fn of(points: i32) -> Self {
        let p = i64::from(points);
        if p > 0 {
            StoredDelta(p, p, 0)
        } else {
            StoredDelta(p, 0, p)
        }
    }

    fn add(&mut self, other: StoredDelta) {
        self.0 += other.0;
        self.1 += other.1;
        self.2 += other.2;
    }

    fn negated(self) -> Self {
        StoredDelta(-self.0, -self.1, -self.2)
    }
}

/// `column + delta`，由数据库原子计算
fn bumped<C: IntoColumnRef + Copy>(column: C, delta: i64) -> Expr {
    sea_orm::sea_query::ExprTrait::add(Expr::col(column), delta)
}

/// 按学生应用增量并更新班级汇总，返回 (更新后的学生行, 班级行)
///
/// 汇总列以 `SET total = total + ?` 原子更新，并发写入不会互相覆盖。
async fn apply_deltas(
    txn: &DatabaseTransaction,
    classroom_id: &str,
    deltas: Vec<(String, StoredDelta)>,
) -> Result<(
    Vec<crate::entity::students::Model>,
    crate::entity::classrooms::Model,
)> {
    let now = now_secs();
    let mut classroom_delta = StoredDelta::default();
    let mut order = Vec::with_capacity(deltas.len());

    for (student_id, delta) in deltas {
        let result = Students::update_many()
            .col_expr(
                students::Column::PointTotal,
                bumped(students::Column::PointTotal, delta.0),
            )
            .col_expr(
                students::Column::PositiveTotal,
                bumped(students::Column::PositiveTotal, delta.1),
            )
            .col_expr(
                students::Column::NegativeTotal,
                bumped(students::Column::NegativeTotal, delta.2),
            )
            .col_expr(students::Column::UpdatedAt, Expr::value(now))
            .filter(students::Column::Id.eq(student_id.as_str()))
            .filter(students::Column::ClassroomId.eq(classroom_id))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ClassPointsError::not_found(format!(
                "Student {student_id} not found in classroom"
            )));
        }

        classroom_delta.add(delta);
        order.push(student_id);
    }

    let result = Classrooms::update_many()
        .col_expr(
            classrooms::Column::PointTotal,
            bumped(classrooms::Column::PointTotal, classroom_delta.0),
        )
        .col_expr(
            classrooms::Column::PositiveTotal,
            bumped(classrooms::Column::PositiveTotal, classroom_delta.1),
        )
        .col_expr(
            classrooms::Column::NegativeTotal,
            bumped(classrooms::Column::NegativeTotal, classroom_delta.2),
        )
        .col_expr(classrooms::Column::UpdatedAt, Expr::value(now))
        .filter(classrooms::Column::Id.eq(classroom_id))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(ClassPointsError::not_found(format!(
            "Classroom {classroom_id} not found"
        )));
    }

    // 写后重读，拿到数据库计算出的最新汇总
    let mut rows: HashMap<String, students::Model> = Students::find()
        .filter(students::Column::Id.is_in(order.iter().cloned()))
        .all(txn)
        .await?
        .into_iter()
        .map(|m| (m.id.clone(), m))
        .collect();
    let updated: Vec<students::Model> = order
        .iter()
        .filter_map(|id| rows.remove(id))
        .collect();

    let classroom = Classrooms::find_by_id(classroom_id.to_string())
        .one(txn)
        .await?
        .ok_or_else(|| ClassPointsError::not_found(format!("Classroom {classroom_id} not found")))?;

    Ok((updated, classroom))
}

/// 按学生首次出现的顺序合并增量
fn group_deltas<'a>(items: impl Iterator<Item = (&'a str, i32)>) -> Vec<(String, StoredDelta)> {
    let mut order: Vec<(String, StoredDelta)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (student_id, points) in items {
        match index.get(student_id) {
            Some(&i) => order[i].1.add(StoredDelta::of(points)),
            None => {
                index.insert(student_id.to_string(), order.len());
                order.push((student_id.to_string(), StoredDelta::of(points)));
            }
        }
    }
    order
}

impl SeaOrmStorage {
    /// 写入流水并更新汇总
    pub async fn award_points_impl(
        &self,
        classroom_id: &str,
        transactions: Vec<NewTransaction>,
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome> {
        if transactions.is_empty() {
            return Err(ClassPointsError::validation("No students to award"));
        }

        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let now = now_secs();

        let deltas = group_deltas(
            transactions
                .iter()
                .map(|t| (t.student_id.as_str(), t.points)),
        );
        let (students, classroom) = apply_deltas(&txn, classroom_id, deltas).await?;

        let mut inserted = Vec::with_capacity(transactions.len());
        for t in transactions {
            let model = ActiveModel {
                id: Set(new_id()),
                student_id: Set(t.student_id),
                classroom_id: Set(classroom_id.to_string()),
                behavior_id: Set(t.behavior_id),
                behavior_name: Set(t.behavior_name),
                behavior_icon: Set(t.behavior_icon),
                points: Set(t.points),
                note: Set(t.note),
                batch_id: Set(t.batch_id),
                created_at: Set(t.created_at.timestamp_millis()),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("写入积分流水失败: {e}")))?;
            inserted.push(model.into_transaction());
        }

        txn.commit().await?;

        self.outcome(inserted, students, classroom, window).await
    }

    /// 删除流水并回退汇总
    pub async fn undo_transactions_impl(
        &self,
        classroom_id: &str,
        ids: &[String],
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome> {
        if ids.is_empty() {
            return Err(ClassPointsError::validation("Nothing to undo"));
        }

        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;

        let rows = PointTransactions::find()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .filter(Column::ClassroomId.eq(classroom_id))
            .order_by_asc(Column::CreatedAt)
            .all(&txn)
            .await?;
        if rows.len() != ids.len() {
            return Err(ClassPointsError::not_found(
                "Transaction already undone or not in classroom",
            ));
        }

        let deltas = group_deltas(rows.iter().map(|r| (r.student_id.as_str(), r.points)))
            .into_iter()
            .map(|(id, d)| (id, d.negated()))
            .collect();

        PointTransactions::delete_many()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .exec(&txn)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除积分流水失败: {e}")))?;

        let (students, classroom) = apply_deltas(&txn, classroom_id, deltas).await?;
        txn.commit().await?;

        let removed = rows.into_iter().map(|r| r.into_transaction()).collect();
        self.outcome(removed, students, classroom, window).await
    }

    async fn outcome(
        &self,
        transactions: Vec<PointTransaction>,
        students: Vec<crate::entity::students::Model>,
        classroom: crate::entity::classrooms::Model,
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome> {
        let ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();
        let sums = period_sums_in(
            &self.db,
            Condition::all().add(Column::StudentId.is_in(ids)),
            window,
        )
        .await?;

        Ok(PointsWriteOutcome {
            transactions,
            students: students
                .into_iter()
                .map(|s| with_periods(s, &sums))
                .collect(),
            classroom: classroom.into_classroom(),
        })
    }

    /// 通过 ID 获取流水
    pub async fn get_transaction_impl(&self, id: &str) -> Result<Option<PointTransaction>> {
        let result = PointTransactions::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询积分流水失败: {e}")))?;

        Ok(result.map(|m| m.into_transaction()))
    }

    /// 获取批次内全部流水
    pub async fn list_batch_transactions_impl(
        &self,
        batch_id: &str,
    ) -> Result<Vec<PointTransaction>> {
        let models = PointTransactions::find()
            .filter(Column::BatchId.eq(batch_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询批次流水失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_transaction()).collect())
    }

    /// 某时间点之后的流水，新到旧
    pub async fn list_transactions_since_impl(
        &self,
        classroom_id: &str,
        since_ms: i64,
    ) -> Result<Vec<PointTransaction>> {
        let models = PointTransactions::find()
            .filter(Column::ClassroomId.eq(classroom_id))
            .filter(Column::CreatedAt.gte(since_ms))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询近期流水失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_transaction()).collect())
    }

    /// 分页查询历史
    pub async fn list_transactions_impl(
        &self,
        classroom_id: &str,
        student_id: Option<&str>,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PointTransaction>> {
        let page = page.max(1);
        let size = size.max(1);

        let mut select = PointTransactions::find().filter(Column::ClassroomId.eq(classroom_id));
        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            ClassPointsError::database_operation(format!("查询流水总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            ClassPointsError::database_operation(format!("查询流水页数失败: {e}"))
        })?;
        let items = paginator.fetch_page(page - 1).await.map_err(|e| {
            ClassPointsError::database_operation(format!("查询流水列表失败: {e}"))
        })?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_transaction()).collect(),
            pagination: PaginationInfo {
                page,
                page_size: size,
                total,
                total_pages: pages,
            },
        })
    }

    /// 班级全部流水，新到旧
    pub async fn list_all_transactions_impl(
        &self,
        classroom_id: &str,
    ) -> Result<Vec<PointTransaction>> {
        let models = PointTransactions::find()
            .filter(Column::ClassroomId.eq(classroom_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询积分流水失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_transaction()).collect())
    }

    /// 班级内每个学生的 (今日, 本周) 积分
    pub async fn period_sums_impl(
        &self,
        classroom_id: &str,
        window: PeriodWindow,
    ) -> Result<HashMap<String, (i64, i64)>> {
        period_sums_in(
            &self.db,
            Condition::all().add(Column::ClassroomId.eq(classroom_id)),
            window,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{
        classroom_with_students, seed_classroom, seed_teacher,
    };

    fn window() -> PeriodWindow {
        PeriodWindow::containing(chrono::Utc::now(), 0)
    }

    fn award(student_id: &str, points: i32, batch_id: Option<&str>) -> NewTransaction {
        NewTransaction {
            student_id: student_id.to_string(),
            behavior_id: None,
            behavior_name: "Helping Others".to_string(),
            behavior_icon: "🤝".to_string(),
            points,
            note: None,
            batch_id: batch_id.map(str::to_string),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_award_then_undo_restores_totals() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann"]).await;

        let awarded = storage
            .award_points_impl(&classroom_id, vec![award(&students[0], 3, None)], window())
            .await
            .unwrap();
        assert_eq!(awarded.classroom.point_total, 3);
        assert_eq!(awarded.students[0].point_total, 3);
        assert_eq!(awarded.students[0].today_total, 3);
        assert_eq!(awarded.students[0].this_week_total, 3);

        let ids = vec![awarded.transactions[0].id.clone()];
        let undone = storage
            .undo_transactions_impl(&classroom_id, &ids, window())
            .await
            .unwrap();
        assert_eq!(undone.classroom.point_total, 0);
        assert_eq!(undone.classroom.positive_total, 0);
        assert_eq!(undone.students[0].point_total, 0);
        assert_eq!(undone.students[0].today_total, 0);
        assert!(storage.get_transaction_impl(&ids[0]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_award_keeps_sum_invariant() {
        let (storage, _, classroom_id, students) =
            classroom_with_students(&["Ann", "Ben", "Cal"]).await;
        let batch: Vec<NewTransaction> = students
            .iter()
            .map(|id| award(id, -2, Some("batch-1")))
            .collect();
        storage
            .award_points_impl(&classroom_id, batch, window())
            .await
            .unwrap();
        storage
            .award_points_impl(&classroom_id, vec![award(&students[1], 5, None)], window())
            .await
            .unwrap();

        let classroom = storage.get_classroom_impl(&classroom_id).await.unwrap().unwrap();
        let list = storage.list_students_impl(&classroom_id, window()).await.unwrap();
        let sum: i64 = list.iter().map(|s| s.point_total).sum();
        assert_eq!(classroom.point_total, sum);
        assert_eq!(classroom.point_total, -1);
        assert_eq!(classroom.positive_total, 5);
        assert_eq!(classroom.negative_total, -6);

        let in_batch = storage.list_batch_transactions_impl("batch-1").await.unwrap();
        assert_eq!(in_batch.len(), 3);
    }

    #[tokio::test]
    async fn test_undo_twice_fails_without_double_revert() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann"]).await;
        let awarded = storage
            .award_points_impl(&classroom_id, vec![award(&students[0], 2, None)], window())
            .await
            .unwrap();
        let ids = vec![awarded.transactions[0].id.clone()];
        storage
            .undo_transactions_impl(&classroom_id, &ids, window())
            .await
            .unwrap();
        assert!(
            storage
                .undo_transactions_impl(&classroom_id, &ids, window())
                .await
                .is_err()
        );
        let classroom = storage.get_classroom_impl(&classroom_id).await.unwrap().unwrap();
        assert_eq!(classroom.point_total, 0);
    }

    #[tokio::test]
    async fn test_award_to_student_of_other_classroom_rolls_back() {
        let (storage, user_id, classroom_id, students) = classroom_with_students(&["Ann"]).await;
        let other = storage.create_classroom_impl(&user_id, "Other").await.unwrap();
        let result = storage
            .award_points_impl(&other.id, vec![award(&students[0], 1, None)], window())
            .await;
        assert!(result.is_err());
        let history = storage
            .list_transactions_impl(&classroom_id, None, 1, 50)
            .await
            .unwrap();
        assert_eq!(history.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_reset_and_recompute() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann", "Ben"]).await;
        storage
            .award_points_impl(
                &classroom_id,
                vec![award(&students[0], 3, None), award(&students[1], -1, None)],
                window(),
            )
            .await
            .unwrap();

        let recomputed = storage
            .recompute_classroom_totals_impl(&classroom_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recomputed.point_total, 2);

        let deleted = storage.reset_classroom_points_impl(&classroom_id).await.unwrap();
        assert_eq!(deleted, 2);
        let classroom = storage.get_classroom_impl(&classroom_id).await.unwrap().unwrap();
        assert_eq!(classroom.point_total, 0);
        assert_eq!(classroom.negative_total, 0);
    }

    #[tokio::test]
    async fn test_delete_student_subtracts_from_classroom() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann", "Ben"]).await;
        storage
            .award_points_impl(
                &classroom_id,
                vec![award(&students[0], 3, None), award(&students[1], 4, None)],
                window(),
            )
            .await
            .unwrap();
        let classroom = storage
            .delete_student_impl(&students[0])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(classroom.point_total, 4);
        assert_eq!(classroom.positive_total, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_awards_on_file_sqlite_all_land() {
        const AWARDS: i64 = 40;

        let path = std::env::temp_dir().join(format!("classpoints-{}.db", new_id()));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let storage = SeaOrmStorage::connect(&url, 8, 30).await.unwrap();
        let user_id = seed_teacher(&storage).await;
        let (classroom_id, students) = seed_classroom(&storage, &user_id, &["Ann", "Ben"]).await;

        let mut handles = Vec::new();
        for i in 0..AWARDS {
            let storage = storage.clone();
            let classroom_id = classroom_id.clone();
            let student_id = students[(i % 2) as usize].clone();
            handles.push(tokio::spawn(async move {
                storage
                    .award_points_impl(&classroom_id, vec![award(&student_id, 1, None)], window())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let classroom = storage.get_classroom_impl(&classroom_id).await.unwrap().unwrap();
        assert_eq!(classroom.point_total, AWARDS);
        assert_eq!(classroom.positive_total, AWARDS);

        let list = storage.list_students_impl(&classroom_id, window()).await.unwrap();
        let sum: i64 = list.iter().map(|s| s.point_total).sum();
        assert_eq!(sum, AWARDS);
        assert!(list.iter().all(|s| s.point_total == AWARDS / 2));

        let rows = storage.list_all_transactions_impl(&classroom_id).await.unwrap();
        assert_eq!(rows.len() as i64, AWARDS);

        drop(storage);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
