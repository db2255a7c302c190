//! 座位表实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seating_charts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub classroom_id: String,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub grid_size: f64,
    pub snap_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classrooms::Entity",
        from = "Column::ClassroomId",
        to = "super::classrooms::Column::Id"
    )]
    Classroom,
    #[sea_orm(has_many = "super::seating_groups::Entity")]
    Groups,
    #[sea_orm(has_many = "super::room_elements::Entity")]
    RoomElements,
}

impl Related<super::classrooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl Related<super::seating_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::room_elements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomElements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 组和设施由存储层另行加载
    pub fn into_chart(self) -> crate::models::seating::entities::SeatingChart {
        use crate::models::seating::entities::SeatingChart;

        SeatingChart {
            id: self.id,
            classroom_id: self.classroom_id,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            grid_size: self.grid_size,
            snap_enabled: self.snap_enabled,
            groups: Vec::new(),
            elements: Vec::new(),
            created_at: super::from_unix(self.created_at),
            updated_at: super::from_unix(self.updated_at),
        }
    }
}
