//! 布局预设实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "layout_presets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub layout: String,
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
    pub fn into_preset(
        self,
    ) -> Result<crate::models::presets::entities::LayoutPreset, serde_json::Error> {
        use crate::models::presets::entities::LayoutPreset;

        Ok(LayoutPreset {
            layout: serde_json::from_str(&self.layout)?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            created_at: super::from_unix(self.created_at),
            updated_at: super::from_unix(self.updated_at),
        })
    }
}
