//! 教室设施实体（讲台、门、窗等）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "room_elements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub chart_id: String,
    pub kind: String,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
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
}

impl Related<super::seating_charts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_element(self) -> crate::models::seating::entities::RoomElement {
        use crate::models::seating::entities::{RoomElement, RoomElementKind};

        RoomElement {
            id: self.id,
            chart_id: self.chart_id,
            kind: self
                .kind
                .parse::<RoomElementKind>()
                .unwrap_or(RoomElementKind::Counter),
            label: self.label,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
        }
    }
}
