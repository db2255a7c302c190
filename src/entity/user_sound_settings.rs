//! 用户音效设置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_sound_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub user_id: String,
    pub enabled: bool,
    pub volume: f64,
    pub positive_sound: String,
    pub negative_sound: String,
    pub custom_positive_url: Option<String>,
    pub custom_negative_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_settings(self) -> crate::models::sounds::entities::SoundSettings {
        use crate::models::sounds::entities::{SoundEffect, SoundSettings};

        SoundSettings {
            enabled: self.enabled,
            volume: self.volume.clamp(0.0, 1.0),
            positive_sound: self
                .positive_sound
                .parse::<SoundEffect>()
                .unwrap_or(SoundEffect::Chime),
            negative_sound: self
                .negative_sound
                .parse::<SoundEffect>()
                .unwrap_or(SoundEffect::Buzz),
            custom_positive_url: self.custom_positive_url,
            custom_negative_url: self.custom_negative_url,
            updated_at: Some(super::from_unix(self.updated_at)),
        }
    }
}
