//! 积分流水实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub student_id: String,
    pub classroom_id: String,
    pub behavior_id: Option<String>,
    pub behavior_name: String,
    pub behavior_icon: String,
    pub points: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub batch_id: Option<String>,
    // 毫秒精度，撤销时需区分同一秒内的多次奖励
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::classrooms::Entity",
        from = "Column::ClassroomId",
        to = "super::classrooms::Column::Id"
    )]
    Classroom,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::classrooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_transaction(self) -> crate::models::transactions::entities::PointTransaction {
        use crate::models::transactions::entities::PointTransaction;

        PointTransaction {
            id: self.id,
            student_id: self.student_id,
            classroom_id: self.classroom_id,
            behavior_id: self.behavior_id,
            behavior_name: self.behavior_name,
            behavior_icon: self.behavior_icon,
            points: self.points,
            note: self.note,
            batch_id: self.batch_id,
            created_at: super::from_unix_millis(self.created_at),
        }
    }
}
