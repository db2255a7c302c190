//! 座位实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seating_seats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub chart_id: String,
    pub position: i32,
    pub student_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seating_groups::Entity",
        from = "Column::GroupId",
        to = "super::seating_groups::Column::Id"
    )]
    Group,
}

impl Related<super::seating_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_seat(self) -> crate::models::seating::entities::SeatingSeat {
        crate::models::seating::entities::SeatingSeat {
            id: self.id,
            group_id: self.group_id,
            position: self.position,
            student_id: self.student_id,
        }
    }
}
