//! 预导入模块，方便使用

pub use super::behaviors::{
    ActiveModel as BehaviorActiveModel, Entity as Behaviors, Model as BehaviorModel,
};
pub use super::classrooms::{
    ActiveModel as ClassroomActiveModel, Entity as Classrooms, Model as ClassroomModel,
};
pub use super::layout_presets::{
    ActiveModel as LayoutPresetActiveModel, Entity as LayoutPresets, Model as LayoutPresetModel,
};
pub use super::point_transactions::{
    ActiveModel as PointTransactionActiveModel, Entity as PointTransactions,
    Model as PointTransactionModel,
};
pub use super::room_elements::{
    ActiveModel as RoomElementActiveModel, Entity as RoomElements, Model as RoomElementModel,
};
pub use super::seating_charts::{
    ActiveModel as SeatingChartActiveModel, Entity as SeatingCharts, Model as SeatingChartModel,
};
pub use super::seating_groups::{
    ActiveModel as SeatingGroupActiveModel, Entity as SeatingGroups, Model as SeatingGroupModel,
};
pub use super::seating_seats::{
    ActiveModel as SeatingSeatActiveModel, Entity as SeatingSeats, Model as SeatingSeatModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::user_sound_settings::{
    ActiveModel as UserSoundSettingsActiveModel, Entity as UserSoundSettings,
    Model as UserSoundSettingsModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
