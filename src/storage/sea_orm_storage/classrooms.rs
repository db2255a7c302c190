//! 班级存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::classrooms::{ActiveModel, Column, Entity as Classrooms};
use crate::entity::point_transactions::{self, Entity as PointTransactions};
use crate::entity::students::{self, Entity as Students};
use crate::errors::{ClassPointsError, Result};
use crate::models::classrooms::{
    entities::Classroom, requests::UpdateClassroomRequest, responses::ClassroomSummary,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_classroom_impl(&self, user_id: &str, name: &str) -> Result<Classroom> {
        let now = now_secs();

        let model = ActiveModel {
            id: Set(new_id()),
            user_id: Set(user_id.to_string()),
            name: Set(name.to_string()),
            point_total: Set(0),
            positive_total: Set(0),
            negative_total: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_classroom())
    }

    /// 通过 ID 获取班级
    pub async fn get_classroom_impl(&self, id: &str) -> Result<Option<Classroom>> {
        let result = Classrooms::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_classroom()))
    }

    /// 列出用户的班级及学生人数
    pub async fn list_classrooms_impl(&self, user_id: &str) -> Result<Vec<ClassroomSummary>> {
        let classrooms = Classrooms::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询班级列表失败: {e}")))?;

        let ids: Vec<String> = classrooms.iter().map(|c| c.id.clone()).collect();
        let counts: HashMap<String, i64> = Students::find()
            .select_only()
            .column(students::Column::ClassroomId)
            .column_as(students::Column::Id.count(), "student_count")
            .filter(students::Column::ClassroomId.is_in(ids))
            .group_by(students::Column::ClassroomId)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("统计学生人数失败: {e}")))?
            .into_iter()
            .collect();

        Ok(classrooms
            .into_iter()
            .map(|m| {
                let student_count = counts.get(&m.id).copied().unwrap_or(0).max(0) as u64;
                ClassroomSummary {
                    classroom: m.into_classroom(),
                    student_count,
                }
            })
            .collect())
    }

    /// 更新班级信息
    pub async fn update_classroom_impl(
        &self,
        id: &str,
        update: UpdateClassroomRequest,
    ) -> Result<Option<Classroom>> {
        let Some(existing) = Classrooms::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询班级失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        model.updated_at = Set(now_secs());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新班级失败: {e}")))?;

        Ok(Some(result.into_classroom()))
    }

    /// 删除班级
    pub async fn delete_classroom_impl(&self, id: &str) -> Result<bool> {
        let result = Classrooms::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 清空班级积分：删除全部流水，学生与班级汇总归零
    pub async fn reset_classroom_points_impl(&self, id: &str) -> Result<u64> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let now = now_secs();

        let deleted = PointTransactions::delete_many()
            .filter(point_transactions::Column::ClassroomId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除积分流水失败: {e}")))?;

        Students::update_many()
            .col_expr(students::Column::PointTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(students::Column::PositiveTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(students::Column::NegativeTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(students::Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(students::Column::ClassroomId.eq(id))
            .exec(&txn)
            .await?;

        Classrooms::update_many()
            .col_expr(Column::PointTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(Column::PositiveTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(Column::NegativeTotal, sea_orm::sea_query::Expr::value(0i64))
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(deleted.rows_affected)
    }

    /// 按流水重新计算汇总
    pub async fn recompute_classroom_totals_impl(&self, id: &str) -> Result<Option<Classroom>> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        recompute_totals_in(&txn, id).await?;
        txn.commit().await?;
        self.get_classroom_impl(id).await
    }
}

/// 在给定连接（通常是事务）中按流水重算某班级的学生与班级汇总
pub(crate) async fn recompute_totals_in<C: ConnectionTrait>(
    conn: &C,
    classroom_id: &str,
) -> Result<()> {
    let rows: Vec<(String, i32)> = PointTransactions::find()
        .select_only()
        .column(point_transactions::Column::StudentId)
        .column(point_transactions::Column::Points)
        .filter(point_transactions::Column::ClassroomId.eq(classroom_id))
        .into_tuple()
        .all(conn)
        .await?;

    // (total, positive, negative)
    let mut per_student: HashMap<String, (i64, i64, i64)> = HashMap::new();
    for (student_id, points) in rows {
        let entry = per_student.entry(student_id).or_default();
        let points = i64::from(points);
        entry.0 += points;
        if points > 0 {
            entry.1 += points;
        } else {
            entry.2 += points;
        }
    }

    let now = now_secs();
    let mut classroom_sum = (0i64, 0i64, 0i64);

    let students = Students::find()
        .filter(students::Column::ClassroomId.eq(classroom_id))
        .all(conn)
        .await?;
    for student in students {
        let (total, positive, negative) =
            per_student.get(&student.id).copied().unwrap_or_default();
        classroom_sum.0 += total;
        classroom_sum.1 += positive;
        classroom_sum.2 += negative;

        let mut model = student.into_active_model();
        model.point_total = Set(total);
        model.positive_total = Set(positive);
        model.negative_total = Set(negative);
        model.updated_at = Set(now);
        model.update(conn).await?;
    }

    let Some(classroom) = Classrooms::find_by_id(classroom_id.to_string())
        .one(conn)
        .await?
    else {
        return Err(ClassPointsError::not_found(format!(
            "Classroom {classroom_id} not found"
        )));
    };
    let mut model = classroom.into_active_model();
    model.point_total = Set(classroom_sum.0);
    model.positive_total = Set(classroom_sum.1);
    model.negative_total = Set(classroom_sum.2);
    model.updated_at = Set(now);
    model.update(conn).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::storage_with_teacher;

    #[tokio::test]
    async fn test_classroom_crud() {
        let (storage, user_id) = storage_with_teacher().await;
        let classroom = storage
            .create_classroom_impl(&user_id, "Room 4B")
            .await
            .unwrap();
        assert_eq!(classroom.point_total, 0);

        let renamed = storage
            .update_classroom_impl(
                &classroom.id,
                UpdateClassroomRequest {
                    name: Some("Room 5A".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Room 5A");

        storage
            .create_students_impl(&classroom.id, vec!["Ann".into(), "Ben".into()])
            .await
            .unwrap();
        let list = storage.list_classrooms_impl(&user_id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].student_count, 2);

        assert!(storage.delete_classroom_impl(&classroom.id).await.unwrap());
        assert!(storage.get_classroom_impl(&classroom.id).await.unwrap().is_none());
    }
}
