//! 行为存储操作

use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::behaviors::{ActiveModel, Column, Entity as Behaviors};
use crate::errors::{ClassPointsError, Result};
use crate::models::behaviors::{
    entities::{Behavior, BehaviorCategory},
    requests::{CreateBehaviorRequest, UpdateBehaviorRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 列出全局行为与用户自定义行为
    pub async fn list_behaviors_impl(&self, user_id: &str) -> Result<Vec<Behavior>> {
        let models = Behaviors::find()
            .filter(
                Condition::any()
                    .add(Column::UserId.is_null())
                    .add(Column::UserId.eq(user_id)),
            )
            .order_by_asc(Column::IsCustom)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询行为列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_behavior()).collect())
    }

    /// 通过 ID 获取行为
    pub async fn get_behavior_impl(&self, id: &str) -> Result<Option<Behavior>> {
        let result = Behaviors::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询行为失败: {e}")))?;

        Ok(result.map(|m| m.into_behavior()))
    }

    /// 创建自定义行为
    pub async fn create_behavior_impl(
        &self,
        user_id: &str,
        req: CreateBehaviorRequest,
    ) -> Result<Behavior> {
        let now = now_secs();
        let category = req
            .category
            .unwrap_or_else(|| BehaviorCategory::for_points(req.points));

        let model = ActiveModel {
            id: Set(new_id()),
            user_id: Set(Some(user_id.to_string())),
            name: Set(req.name),
            points: Set(req.points),
            icon: Set(req.icon),
            category: Set(category.to_string()),
            is_custom: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("创建行为失败: {e}")))?;

        Ok(result.into_behavior())
    }

    /// 更新行为
    pub async fn update_behavior_impl(
        &self,
        id: &str,
        update: UpdateBehaviorRequest,
    ) -> Result<Option<Behavior>> {
        let Some(existing) = Behaviors::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询行为失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(points) = update.points {
            model.points = Set(points);
        }
        if let Some(icon) = update.icon {
            model.icon = Set(icon);
        }
        if let Some(category) = update.category {
            model.category = Set(category.to_string());
        }
        model.updated_at = Set(now_secs());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新行为失败: {e}")))?;

        Ok(Some(result.into_behavior()))
    }

    /// 删除行为
    pub async fn delete_behavior_impl(&self, id: &str) -> Result<bool> {
        let result = Behaviors::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除行为失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::storage_with_teacher;

    #[tokio::test]
    async fn test_default_catalog_is_seeded() {
        let (storage, user_id) = storage_with_teacher().await;
        let behaviors = storage.list_behaviors_impl(&user_id).await.unwrap();
        assert_eq!(behaviors.len(), 11);
        assert!(behaviors.iter().all(|b| !b.is_custom && b.user_id.is_none()));
        assert!(
            behaviors
                .iter()
                .all(|b| b.category == BehaviorCategory::for_points(b.points))
        );
    }

    #[tokio::test]
    async fn test_custom_behavior_visible_only_to_owner() {
        let (storage, user_id) = storage_with_teacher().await;
        let custom = storage
            .create_behavior_impl(
                &user_id,
                CreateBehaviorRequest {
                    name: "Tidy Desk".to_string(),
                    points: 2,
                    icon: "🧹".to_string(),
                    category: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(custom.category, BehaviorCategory::Positive);
        assert!(custom.is_custom);

        let other = storage.list_behaviors_impl("someone-else").await.unwrap();
        assert!(other.iter().all(|b| b.id != custom.id));
        let own = storage.list_behaviors_impl(&user_id).await.unwrap();
        assert!(own.iter().any(|b| b.id == custom.id));
    }
}
