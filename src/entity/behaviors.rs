//! 行为实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "behaviors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub points: i32,
    pub icon: String,
    pub category: String,
    pub is_custom: bool,
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
    pub fn into_behavior(self) -> crate::models::behaviors::entities::Behavior {
        use crate::models::behaviors::entities::{Behavior, BehaviorCategory};

        let category = self
            .category
            .parse::<BehaviorCategory>()
            .unwrap_or_else(|_| BehaviorCategory::for_points(self.points));

        Behavior {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            points: self.points,
            icon: self.icon,
            category,
            is_custom: self.is_custom,
            created_at: super::from_unix(self.created_at),
            updated_at: super::from_unix(self.updated_at),
        }
    }
}
