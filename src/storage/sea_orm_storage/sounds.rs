//! 音效设置存储操作

use super::{SeaOrmStorage, new_id, now_secs};
use crate::entity::user_sound_settings::{ActiveModel, Column, Entity as UserSoundSettings};
use crate::errors::{ClassPointsError, Result};
use crate::models::sounds::entities::SoundSettings;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};

impl SeaOrmStorage {
    /// 获取用户音效设置
    pub async fn get_sound_settings_impl(&self, user_id: &str) -> Result<Option<SoundSettings>> {
        let result = UserSoundSettings::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询音效设置失败: {e}")))?;

        Ok(result.map(|m| m.into_settings()))
    }

    /// 写入用户音效设置（不存在则创建）
    pub async fn upsert_sound_settings_impl(
        &self,
        user_id: &str,
        settings: SoundSettings,
    ) -> Result<SoundSettings> {
        let now = now_secs();
        let existing = UserSoundSettings::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let saved = match existing {
            Some(model) => {
                let mut model = model.into_active_model();
                model.enabled = Set(settings.enabled);
                model.volume = Set(settings.volume);
                model.positive_sound = Set(settings.positive_sound.to_string());
                model.negative_sound = Set(settings.negative_sound.to_string());
                model.custom_positive_url = Set(settings.custom_positive_url);
                model.custom_negative_url = Set(settings.custom_negative_url);
                model.updated_at = Set(now);
                model.update(&self.db).await
            }
            None => {
                ActiveModel {
                    id: Set(new_id()),
                    user_id: Set(user_id.to_string()),
                    enabled: Set(settings.enabled),
                    volume: Set(settings.volume),
                    positive_sound: Set(settings.positive_sound.to_string()),
                    negative_sound: Set(settings.negative_sound.to_string()),
                    custom_positive_url: Set(settings.custom_positive_url),
                    custom_negative_url: Set(settings.custom_negative_url),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| ClassPointsError::database_operation(format!("保存音效设置失败: {e}")))?;

        Ok(saved.into_settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sounds::entities::SoundEffect;
    use crate::storage::sea_orm_storage::test_support::storage_with_teacher;

    #[tokio::test]
    async fn test_upsert_sound_settings() {
        let (storage, user_id) = storage_with_teacher().await;
        assert!(storage.get_sound_settings_impl(&user_id).await.unwrap().is_none());

        let saved = storage
            .upsert_sound_settings_impl(&user_id, SoundSettings::default())
            .await
            .unwrap();
        assert_eq!(saved.positive_sound, SoundEffect::Chime);

        let changed = storage
            .upsert_sound_settings_impl(
                &user_id,
                SoundSettings {
                    negative_sound: SoundEffect::Thud,
                    volume: 0.3,
                    ..SoundSettings::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(changed.negative_sound, SoundEffect::Thud);
        assert_eq!(changed.volume, 0.3);
    }
}
