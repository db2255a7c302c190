//! 座位组实体（每组 4 个座位）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seating_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub chart_id: String,
    pub letter: String,
    pub x: f64,
    pub y: f64,
    pub rotation: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seating_charts::Entity",
        from = "Column::ChartId",
        to = "super::seating_charts::Column::Id"
    )]
    Chart,
    #[sea_orm(has_many = "super::seating_seats::Entity")]
    Seats,
}

impl Related<super::seating_charts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chart.def()
    }
}

impl Related<super::seating_seats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_group(
        self,
        seats: Vec<crate::models::seating::entities::SeatingSeat>,
    ) -> crate::models::seating::entities::SeatingGroup {
        use crate::models::seating::entities::SeatingGroup;

        SeatingGroup {
            id: self.id,
            chart_id: self.chart_id,
            letter: self.letter,
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            seats,
        }
    }
}
