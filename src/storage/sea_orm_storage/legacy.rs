//! 旧版数据导入写入

use std::collections::HashSet;

use super::classrooms::recompute_totals_in;
use super::{SeaOrmStorage, now_secs};
use crate::entity::{behaviors, classrooms, point_transactions, students};
use crate::errors::{ClassPointsError, Result};
use crate::models::legacy::entities::LegacyImportPlan;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

impl SeaOrmStorage {
    /// 在单个事务中写入导入计划，随后按流水重算汇总
    pub async fn import_legacy_impl(&self, plan: LegacyImportPlan) -> Result<()> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let now = now_secs();

        for c in &plan.classrooms {
            classrooms::ActiveModel {
                id: Set(c.id.clone()),
                user_id: Set(plan.user_id.clone()),
                name: Set(c.name.clone()),
                point_total: Set(0),
                positive_total: Set(0),
                negative_total: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassPointsError::migration(format!("导入班级 {} 失败: {e}", c.name)))?;
        }

        for s in &plan.students {
            students::ActiveModel {
                id: Set(s.id.clone()),
                classroom_id: Set(s.classroom_id.clone()),
                name: Set(s.name.clone()),
                avatar_color: Set(s.avatar_color.clone()),
                point_total: Set(0),
                positive_total: Set(0),
                negative_total: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassPointsError::migration(format!("导入学生 {} 失败: {e}", s.name)))?;
        }

        for b in &plan.behaviors {
            behaviors::ActiveModel {
                id: Set(b.id.clone()),
                user_id: Set(Some(plan.user_id.clone())),
                name: Set(b.name.clone()),
                points: Set(b.points),
                icon: Set(b.icon.clone()),
                category: Set(b.category.to_string()),
                is_custom: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassPointsError::migration(format!("导入行为 {} 失败: {e}", b.name)))?;
        }

        for t in &plan.transactions {
            point_transactions::ActiveModel {
                id: Set(t.id.clone()),
                student_id: Set(t.student_id.clone()),
                classroom_id: Set(t.classroom_id.clone()),
                behavior_id: Set(t.behavior_id.clone()),
                behavior_name: Set(t.behavior_name.clone()),
                behavior_icon: Set(t.behavior_icon.clone()),
                points: Set(t.points),
                note: Set(t.note.clone()),
                batch_id: Set(None),
                created_at: Set(t.created_at_ms),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassPointsError::migration(format!("导入积分流水失败: {e}")))?;
        }

        let touched: HashSet<&str> = plan.classrooms.iter().map(|c| c.id.as_str()).collect();
        for classroom_id in touched {
            recompute_totals_in(&txn, classroom_id).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
