//! 学生存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::classrooms::Entity as Classrooms;
use crate::entity::point_transactions::{self, Entity as PointTransactions};
use crate::entity::students::{ActiveModel, Column, Entity as Students, Model};
use crate::errors::{ClassPointsError, Result};
use crate::models::{
    PeriodWindow,
    classrooms::entities::Classroom,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, UpdateStudentRequest},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

fn new_student_model(classroom_id: &str, name: String, avatar_color: Option<String>) -> ActiveModel {
    let now = now_secs();
    ActiveModel {
        id: Set(new_id()),
        classroom_id: Set(classroom_id.to_string()),
        name: Set(name),
        avatar_color: Set(avatar_color),
        point_total: Set(0),
        positive_total: Set(0),
        negative_total: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// 填充今日/本周积分
pub(crate) fn with_periods(model: Model, sums: &HashMap<String, (i64, i64)>) -> Student {
    let (today, week) = sums.get(&model.id).copied().unwrap_or_default();
    let mut student = model.into_student();
    student.today_total = today;
    student.this_week_total = week;
    student
}

/// 统计本周内流水的 (今日, 本周) 合计，按学生分组
pub(crate) async fn period_sums_in<C: ConnectionTrait>(
    conn: &C,
    filter: sea_orm::Condition,
    window: PeriodWindow,
) -> Result<HashMap<String, (i64, i64)>> {
    let rows: Vec<(String, i32, i64)> = PointTransactions::find()
        .select_only()
        .column(point_transactions::Column::StudentId)
        .column(point_transactions::Column::Points)
        .column(point_transactions::Column::CreatedAt)
        .filter(filter)
        .filter(point_transactions::Column::CreatedAt.gte(window.week_start_ms))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| ClassPointsError::database_operation(format!("统计周期积分失败: {e}")))?;

    let mut sums: HashMap<String, (i64, i64)> = HashMap::new();
    for (student_id, points, created_at) in rows {
        let entry = sums.entry(student_id).or_default();
        if window.is_this_week(created_at) {
            entry.1 += i64::from(points);
        }
        if window.is_today(created_at) {
            entry.0 += i64::from(points);
        }
    }
    Ok(sums)
}

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(
        &self,
        classroom_id: &str,
        req: CreateStudentRequest,
    ) -> Result<Student> {
        let result = new_student_model(classroom_id, req.name, req.avatar_color)
            .insert(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    /// 批量创建学生（全部成功或全部失败）
    pub async fn create_students_impl(
        &self,
        classroom_id: &str,
        names: Vec<String>,
    ) -> Result<Vec<Student>> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let model = new_student_model(classroom_id, name, None)
                .insert(&txn)
                .await
                .map_err(|e| ClassPointsError::database_operation(format!("创建学生失败: {e}")))?;
            created.push(model.into_student());
        }
        txn.commit().await?;
        Ok(created)
    }

    /// 获取学生
    pub async fn get_student_impl(
        &self,
        id: &str,
        window: PeriodWindow,
    ) -> Result<Option<Student>> {
        let Some(model) = Students::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Ok(None);
        };

        let sums = period_sums_in(
            &self.db,
            sea_orm::Condition::all().add(point_transactions::Column::StudentId.eq(id)),
            window,
        )
        .await?;
        Ok(Some(with_periods(model, &sums)))
    }

    /// 列出班级学生（按姓名排序）
    pub async fn list_students_impl(
        &self,
        classroom_id: &str,
        window: PeriodWindow,
    ) -> Result<Vec<Student>> {
        let models = Students::find()
            .filter(Column::ClassroomId.eq(classroom_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询学生列表失败: {e}")))?;

        let sums = self.period_sums_impl(classroom_id, window).await?;
        Ok(models
            .into_iter()
            .map(|m| with_periods(m, &sums))
            .collect())
    }

    /// 更新学生
    pub async fn update_student_impl(
        &self,
        id: &str,
        update: UpdateStudentRequest,
        window: PeriodWindow,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(color) = update.avatar_color {
            model.avatar_color = Set((!color.is_empty()).then_some(color));
        }
        model.updated_at = Set(now_secs());
        model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新学生失败: {e}")))?;

        self.get_student_impl(id, window).await
    }

    /// 删除学生，班级汇总同步扣除该学生的累计积分
    pub async fn delete_student_impl(&self, id: &str) -> Result<Option<Classroom>> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;

        let Some(student) = Students::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let classroom = Classrooms::find_by_id(student.classroom_id.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| ClassPointsError::not_found("Classroom not found"))?;

        Students::delete_by_id(student.id.clone())
            .exec(&txn)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除学生失败: {e}")))?;

        let point_total = classroom.point_total - student.point_total;
        let positive_total = classroom.positive_total - student.positive_total;
        let negative_total = classroom.negative_total - student.negative_total;
        let mut model = classroom.into_active_model();
        model.point_total = Set(point_total);
        model.positive_total = Set(positive_total);
        model.negative_total = Set(negative_total);
        model.updated_at = Set(now_secs());
        let classroom = model.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(classroom.into_classroom()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::classroom_with_students;

    fn window() -> PeriodWindow {
        PeriodWindow::containing(chrono::Utc::now(), 0)
    }

    #[tokio::test]
    async fn test_list_students_sorted_by_name() {
        let (storage, _, classroom_id, _) = classroom_with_students(&["Zoe", "Adam", "Mia"]).await;
        let names: Vec<String> = storage
            .list_students_impl(&classroom_id, window())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Adam", "Mia", "Zoe"]);
    }

    #[tokio::test]
    async fn test_update_student_clears_color() {
        let (storage, _, classroom_id, _) = classroom_with_students(&[]).await;
        let student = storage
            .create_student_impl(
                &classroom_id,
                CreateStudentRequest {
                    name: "Ann".to_string(),
                    avatar_color: Some("#ff0000".to_string()),
                },
            )
            .await
            .unwrap();
        let updated = storage
            .update_student_impl(
                &student.id,
                UpdateStudentRequest {
                    name: None,
                    avatar_color: Some(String::new()),
                },
                window(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.avatar_color, None);
    }
}
