use std::sync::Arc;

use crate::config::SeatingConfig;
use crate::models::{
    PaginatedResponse, PeriodWindow,
    behaviors::{
        entities::Behavior,
        requests::{CreateBehaviorRequest, UpdateBehaviorRequest},
    },
    classrooms::{
        entities::Classroom,
        requests::UpdateClassroomRequest,
        responses::ClassroomSummary,
    },
    legacy::entities::LegacyImportPlan,
    presets::entities::{LayoutPreset, PresetLayout},
    seating::entities::{
        NewRoomElement, RoomElement, RoomElementUpdate, SeatingChart, SeatingGroup,
        SeatingGroupUpdate, SeatingSeat,
    },
    sounds::entities::SoundSettings,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, UpdateStudentRequest},
    },
    transactions::entities::{NewTransaction, PointTransaction, PointsWriteOutcome},
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户信息
    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: &str) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 班级管理方法
    // 创建班级
    async fn create_classroom(&self, user_id: &str, name: &str) -> Result<Classroom>;
    // 通过ID获取班级
    async fn get_classroom(&self, id: &str) -> Result<Option<Classroom>>;
    // 列出用户的班级（含学生人数）
    async fn list_classrooms(&self, user_id: &str) -> Result<Vec<ClassroomSummary>>;
    // 更新班级
    async fn update_classroom(
        &self,
        id: &str,
        update: UpdateClassroomRequest,
    ) -> Result<Option<Classroom>>;
    // 删除班级（级联学生、流水、座位表）
    async fn delete_classroom(&self, id: &str) -> Result<bool>;
    // 清空班级积分，返回删除的流水数
    async fn reset_classroom_points(&self, id: &str) -> Result<u64>;
    // 按流水重新计算班级及学生汇总
    async fn recompute_classroom_totals(&self, id: &str) -> Result<Option<Classroom>>;

    /// 学生管理方法
    // 创建学生
    async fn create_student(
        &self,
        classroom_id: &str,
        student: CreateStudentRequest,
    ) -> Result<Student>;
    // 批量创建学生
    async fn create_students(&self, classroom_id: &str, names: Vec<String>)
    -> Result<Vec<Student>>;
    // 获取学生（含今日/本周积分）
    async fn get_student(&self, id: &str, window: PeriodWindow) -> Result<Option<Student>>;
    // 列出班级学生（含今日/本周积分）
    async fn list_students(&self, classroom_id: &str, window: PeriodWindow)
    -> Result<Vec<Student>>;
    // 更新学生
    async fn update_student(
        &self,
        id: &str,
        update: UpdateStudentRequest,
        window: PeriodWindow,
    ) -> Result<Option<Student>>;
    // 删除学生，并从班级汇总中扣除其积分
    async fn delete_student(&self, id: &str) -> Result<Option<Classroom>>;

    /// 行为管理方法
    // 列出用户可见的行为
    async fn list_behaviors(&self, user_id: &str) -> Result<Vec<Behavior>>;
    // 获取行为
    async fn get_behavior(&self, id: &str) -> Result<Option<Behavior>>;
    // 创建自定义行为
    async fn create_behavior(&self, user_id: &str, behavior: CreateBehaviorRequest)
    -> Result<Behavior>;
    // 更新行为
    async fn update_behavior(
        &self,
        id: &str,
        update: UpdateBehaviorRequest,
    ) -> Result<Option<Behavior>>;
    // 删除行为（流水中的 behavior_id 置空）
    async fn delete_behavior(&self, id: &str) -> Result<bool>;

    /// 积分流水方法
    // 写入流水并更新学生、班级汇总（单个数据库事务）
    async fn award_points(
        &self,
        classroom_id: &str,
        transactions: Vec<NewTransaction>,
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome>;
    // 删除流水并回退汇总（单个数据库事务）
    async fn undo_transactions(
        &self,
        classroom_id: &str,
        ids: &[String],
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome>;
    // 获取流水
    async fn get_transaction(&self, id: &str) -> Result<Option<PointTransaction>>;
    // 获取批次内全部流水
    async fn list_batch_transactions(&self, batch_id: &str) -> Result<Vec<PointTransaction>>;
    // 某时间点之后的流水（新到旧）
    async fn list_transactions_since(
        &self,
        classroom_id: &str,
        since_ms: i64,
    ) -> Result<Vec<PointTransaction>>;
    // 分页查询历史
    async fn list_transactions(
        &self,
        classroom_id: &str,
        student_id: Option<&str>,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PointTransaction>>;
    // 班级全部流水（导出用，新到旧）
    async fn list_all_transactions(&self, classroom_id: &str) -> Result<Vec<PointTransaction>>;

    /// 座位表方法
    // 获取或按默认值创建座位表
    async fn get_or_create_chart(
        &self,
        classroom_id: &str,
        defaults: &SeatingConfig,
    ) -> Result<SeatingChart>;
    // 通过 ID 获取座位表
    async fn get_chart_by_id(&self, chart_id: &str) -> Result<Option<SeatingChart>>;
    // 更新画布设置
    async fn update_chart(
        &self,
        chart_id: &str,
        canvas_width: Option<f64>,
        canvas_height: Option<f64>,
        grid_size: Option<f64>,
        snap_enabled: Option<bool>,
    ) -> Result<Option<SeatingChart>>;
    // 新建座位组（含 4 个空座位）
    async fn create_group(&self, chart_id: &str, letter: &str, x: f64, y: f64)
    -> Result<SeatingGroup>;
    // 更新座位组位置或朝向
    async fn update_group(&self, id: &str, update: SeatingGroupUpdate)
    -> Result<Option<SeatingGroup>>;
    // 删除座位组
    async fn delete_group(&self, id: &str) -> Result<bool>;
    // 安排学生入座（先清除其在该座位表中的原座位），返回变动的座位
    async fn assign_seat(&self, seat_id: &str, student_id: &str) -> Result<Vec<SeatingSeat>>;
    // 清空座位
    async fn unassign_seat(&self, seat_id: &str) -> Result<Option<SeatingSeat>>;
    // 清空全部座位后按计划重新入座
    async fn apply_seat_plan(&self, chart_id: &str, plan: Vec<(String, String)>) -> Result<()>;
    // 新建设施
    async fn create_element(&self, chart_id: &str, element: NewRoomElement) -> Result<RoomElement>;
    // 更新设施
    async fn update_element(&self, id: &str, update: RoomElementUpdate)
    -> Result<Option<RoomElement>>;
    // 删除设施
    async fn delete_element(&self, id: &str) -> Result<bool>;
    // 以预设替换布局（清除全部组、设施及座位分配）
    async fn replace_layout(&self, chart_id: &str, layout: &PresetLayout) -> Result<()>;

    /// 布局预设方法
    async fn list_presets(&self, user_id: &str) -> Result<Vec<LayoutPreset>>;
    async fn get_preset(&self, id: &str) -> Result<Option<LayoutPreset>>;
    async fn create_preset(
        &self,
        user_id: &str,
        name: &str,
        layout: &PresetLayout,
    ) -> Result<LayoutPreset>;
    async fn rename_preset(&self, id: &str, name: &str) -> Result<Option<LayoutPreset>>;
    async fn delete_preset(&self, id: &str) -> Result<bool>;

    /// 音效设置方法
    async fn get_sound_settings(&self, user_id: &str) -> Result<Option<SoundSettings>>;
    async fn upsert_sound_settings(
        &self,
        user_id: &str,
        settings: SoundSettings,
    ) -> Result<SoundSettings>;

    /// 旧版数据导入
    // 写入导入计划并重新计算汇总（单个数据库事务）
    async fn import_legacy(&self, plan: LegacyImportPlan) -> Result<()>;

    /// 存储连通性检查
    async fn ping(&self) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
