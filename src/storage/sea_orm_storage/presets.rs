//! 布局预设存储操作

use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::layout_presets::{ActiveModel, Column, Entity as LayoutPresets};
use crate::errors::{ClassPointsError, Result};
use crate::models::presets::entities::{LayoutPreset, PresetLayout};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 列出用户的预设
    pub async fn list_presets_impl(&self, user_id: &str) -> Result<Vec<LayoutPreset>> {
        let models = LayoutPresets::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询预设列表失败: {e}")))?;

        models
            .into_iter()
            .map(|m| m.into_preset().map_err(Into::into))
            .collect()
    }

    /// 通过 ID 获取预设
    pub async fn get_preset_impl(&self, id: &str) -> Result<Option<LayoutPreset>> {
        let result = LayoutPresets::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询预设失败: {e}")))?;

        result.map(|m| m.into_preset().map_err(Into::into)).transpose()
    }

    /// 保存预设
    pub async fn create_preset_impl(
        &self,
        user_id: &str,
        name: &str,
        layout: &PresetLayout,
    ) -> Result<LayoutPreset> {
        let now = now_secs();
        let model = ActiveModel {
            id: Set(new_id()),
            user_id: Set(user_id.to_string()),
            name: Set(name.to_string()),
            layout: Set(serde_json::to_string(layout)?),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ClassPointsError::database_operation(format!("保存预设失败: {e}")))?;

        Ok(model.into_preset()?)
    }

    /// 重命名预设
    pub async fn rename_preset_impl(&self, id: &str, name: &str) -> Result<Option<LayoutPreset>> {
        let Some(existing) = LayoutPresets::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());
        model.updated_at = Set(now_secs());
        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新预设失败: {e}")))?;

        Ok(Some(updated.into_preset()?))
    }

    /// 删除预设
    pub async fn delete_preset_impl(&self, id: &str) -> Result<bool> {
        let result = LayoutPresets::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除预设失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::storage_with_teacher;

    #[tokio::test]
    async fn test_preset_layout_persists_as_json() {
        let (storage, user_id) = storage_with_teacher().await;
        let layout = PresetLayout {
            canvas_width: 1600.0,
            canvas_height: 1200.0,
            grid_size: 40.0,
            groups: Vec::new(),
            elements: Vec::new(),
        };
        let preset = storage
            .create_preset_impl(&user_id, "Exam rows", &layout)
            .await
            .unwrap();
        let loaded = storage.get_preset_impl(&preset.id).await.unwrap().unwrap();
        assert_eq!(loaded.layout, layout);

        let renamed = storage
            .rename_preset_impl(&preset.id, "Exams")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Exams");
        assert!(storage.delete_preset_impl(&preset.id).await.unwrap());
        assert!(storage.list_presets_impl(&user_id).await.unwrap().is_empty());
    }
}
