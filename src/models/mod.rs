pub mod auth;
pub mod behaviors;
pub mod classrooms;
pub mod common;
pub mod legacy;
pub mod presets;
pub mod realtime;
pub mod seating;
pub mod sounds;
pub mod students;
pub mod system;
pub mod transactions;
pub mod users;

pub use common::{
    ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, PeriodWindow, PointTotals,
};

use serde::Serialize;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 1xxx 通用，2xxx 用户与认证，3xxx 班级，4xxx 学生与名单，
/// 5xxx 行为，6xxx 积分流水，7xxx 座位表，8xxx 音效，9xxx 旧版数据导入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,
    ServiceUnavailable = 1503,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2004,
    UserNameInvalid = 2010,
    UserEmailInvalid = 2011,
    UserPasswordInvalid = 2012,
    UserNameAlreadyExists = 2020,
    UserEmailAlreadyExists = 2021,
    UserUpdateFailed = 2030,

    ClassroomPermissionDenied = 3003,
    ClassroomNotFound = 3004,
    ClassroomNameInvalid = 3010,
    ClassroomCreationFailed = 3020,

    StudentNotFound = 4004,
    StudentNameInvalid = 4010,
    RosterParseFailed = 4020,

    BehaviorPermissionDenied = 5003,
    BehaviorNotFound = 5004,
    BehaviorInvalid = 5010,

    TransactionNotFound = 6004,
    NothingToUndo = 6010,
    UndoWindowExpired = 6011,
    AwardQueued = 6020,
    AwardFailed = 6030,

    SeatingChartNotFound = 7004,
    SeatingGroupNotFound = 7005,
    SeatNotFound = 7006,
    RoomElementNotFound = 7007,
    SeatingInvalid = 7010,
    PresetNotFound = 7104,
    PresetInvalid = 7110,

    SoundUrlInvalid = 8010,
    SoundUrlUnreachable = 8011,
    SoundUrlNotAudio = 8012,

    LegacyDataInvalid = 9010,
    LegacyOrphanedRecords = 9011,
    LegacyImportFailed = 9020,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Component;
    use ts_rs::TS;

    #[test]
    fn test_ts_bindings_stay_inside_export_dir() {
        let paths = [
            users::entities::User::output_path(),
            classrooms::entities::Classroom::output_path(),
            students::entities::Student::output_path(),
            transactions::entities::PointTransaction::output_path(),
            PaginationInfo::output_path(),
        ];
        for path in paths {
            let path = path.expect("type is exported");
            assert!(path.is_relative());
            assert!(path.components().all(|c| c != Component::ParentDir));
        }
    }
}
