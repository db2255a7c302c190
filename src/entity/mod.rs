//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod behaviors;
pub mod classrooms;
pub mod layout_presets;
pub mod point_transactions;
pub mod room_elements;
pub mod seating_charts;
pub mod seating_groups;
pub mod seating_seats;
pub mod students;
pub mod user_sound_settings;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn from_unix(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

pub(crate) fn from_unix_millis(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts).unwrap_or_default()
}
