//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod behaviors;
mod classrooms;
mod legacy;
mod presets;
mod seating;
mod sounds;
mod students;
mod transactions;
mod users;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, SeatingConfig};
use crate::errors::{ClassPointsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    /// SQLite 同一时刻只允许一个写事务，延迟事务升级写锁会直接返回 SQLITE_BUSY
    write_lock: Option<Arc<Mutex<()>>>,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout_secs: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let is_sqlite = db_url.starts_with("sqlite:");
        let db = if is_sqlite {
            Self::connect_sqlite(&db_url, pool_size, timeout_secs).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout_secs).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self {
            db,
            write_lock: is_sqlite.then(|| Arc::new(Mutex::new(()))),
        })
    }

    /// 写事务开始前获取；非 SQLite 后端返回 None
    pub(crate) async fn write_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ClassPointsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("mmap_size", "536870912")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库每个连接各自独立，只能保持单连接且不回收
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .connect_with(opt)
            .await
            .map_err(|e| ClassPointsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5.min(pool_size))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ClassPointsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") || url.starts_with("sqlite::memory:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ClassPointsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", 1, 5).await
    }
}

pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse, PeriodWindow,
    behaviors::{
        entities::Behavior,
        requests::{CreateBehaviorRequest, UpdateBehaviorRequest},
    },
    classrooms::{
        entities::Classroom, requests::UpdateClassroomRequest, responses::ClassroomSummary,
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_last_login(&self, id: &str) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 班级模块
    async fn create_classroom(&self, user_id: &str, name: &str) -> Result<Classroom> {
        self.create_classroom_impl(user_id, name).await
    }

    async fn get_classroom(&self, id: &str) -> Result<Option<Classroom>> {
        self.get_classroom_impl(id).await
    }

    async fn list_classrooms(&self, user_id: &str) -> Result<Vec<ClassroomSummary>> {
        self.list_classrooms_impl(user_id).await
    }

    async fn update_classroom(
        &self,
        id: &str,
        update: UpdateClassroomRequest,
    ) -> Result<Option<Classroom>> {
        self.update_classroom_impl(id, update).await
    }

    async fn delete_classroom(&self, id: &str) -> Result<bool> {
        self.delete_classroom_impl(id).await
    }

    async fn reset_classroom_points(&self, id: &str) -> Result<u64> {
        self.reset_classroom_points_impl(id).await
    }

    async fn recompute_classroom_totals(&self, id: &str) -> Result<Option<Classroom>> {
        self.recompute_classroom_totals_impl(id).await
    }

    // 学生模块
    async fn create_student(
        &self,
        classroom_id: &str,
        student: CreateStudentRequest,
    ) -> Result<Student> {
        self.create_student_impl(classroom_id, student).await
    }

    async fn create_students(
        &self,
        classroom_id: &str,
        names: Vec<String>,
    ) -> Result<Vec<Student>> {
        self.create_students_impl(classroom_id, names).await
    }

    async fn get_student(&self, id: &str, window: PeriodWindow) -> Result<Option<Student>> {
        self.get_student_impl(id, window).await
    }

    async fn list_students(
        &self,
        classroom_id: &str,
        window: PeriodWindow,
    ) -> Result<Vec<Student>> {
        self.list_students_impl(classroom_id, window).await
    }

    async fn update_student(
        &self,
        id: &str,
        update: UpdateStudentRequest,
        window: PeriodWindow,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update, window).await
    }

    async fn delete_student(&self, id: &str) -> Result<Option<Classroom>> {
        self.delete_student_impl(id).await
    }

    // 行为模块
    async fn list_behaviors(&self, user_id: &str) -> Result<Vec<Behavior>> {
        self.list_behaviors_impl(user_id).await
    }

    async fn get_behavior(&self, id: &str) -> Result<Option<Behavior>> {
        self.get_behavior_impl(id).await
    }

    async fn create_behavior(
        &self,
        user_id: &str,
        behavior: CreateBehaviorRequest,
    ) -> Result<Behavior> {
        self.create_behavior_impl(user_id, behavior).await
    }

    async fn update_behavior(
        &self,
        id: &str,
        update: UpdateBehaviorRequest,
    ) -> Result<Option<Behavior>> {
        self.update_behavior_impl(id, update).await
    }

    async fn delete_behavior(&self, id: &str) -> Result<bool> {
        self.delete_behavior_impl(id).await
    }

    // 积分流水模块
    async fn award_points(
        &self,
        classroom_id: &str,
        transactions: Vec<NewTransaction>,
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome> {
        self.award_points_impl(classroom_id, transactions, window)
            .await
    }

    async fn undo_transactions(
        &self,
        classroom_id: &str,
        ids: &[String],
        window: PeriodWindow,
    ) -> Result<PointsWriteOutcome> {
        self.undo_transactions_impl(classroom_id, ids, window).await
    }

    async fn get_transaction(&self, id: &str) -> Result<Option<PointTransaction>> {
        self.get_transaction_impl(id).await
    }

    async fn list_batch_transactions(&self, batch_id: &str) -> Result<Vec<PointTransaction>> {
        self.list_batch_transactions_impl(batch_id).await
    }

    async fn list_transactions_since(
        &self,
        classroom_id: &str,
        since_ms: i64,
    ) -> Result<Vec<PointTransaction>> {
        self.list_transactions_since_impl(classroom_id, since_ms)
            .await
    }

    async fn list_transactions(
        &self,
        classroom_id: &str,
        student_id: Option<&str>,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PointTransaction>> {
        self.list_transactions_impl(classroom_id, student_id, page, size)
            .await
    }

    async fn list_all_transactions(&self, classroom_id: &str) -> Result<Vec<PointTransaction>> {
        self.list_all_transactions_impl(classroom_id).await
    }

    // 座位表模块
    async fn get_or_create_chart(
        &self,
        classroom_id: &str,
        defaults: &SeatingConfig,
    ) -> Result<SeatingChart> {
        self.get_or_create_chart_impl(classroom_id, defaults).await
    }

    async fn get_chart_by_id(&self, chart_id: &str) -> Result<Option<SeatingChart>> {
        self.get_chart_by_id_impl(chart_id).await
    }

    async fn update_chart(
        &self,
        chart_id: &str,
        canvas_width: Option<f64>,
        canvas_height: Option<f64>,
        grid_size: Option<f64>,
        snap_enabled: Option<bool>,
    ) -> Result<Option<SeatingChart>> {
        self.update_chart_impl(chart_id, canvas_width, canvas_height, grid_size, snap_enabled)
            .await
    }

    async fn create_group(
        &self,
        chart_id: &str,
        letter: &str,
        x: f64,
        y: f64,
    ) -> Result<SeatingGroup> {
        self.create_group_impl(chart_id, letter, x, y).await
    }

    async fn update_group(
        &self,
        id: &str,
        update: SeatingGroupUpdate,
    ) -> Result<Option<SeatingGroup>> {
        self.update_group_impl(id, update).await
    }

    async fn delete_group(&self, id: &str) -> Result<bool> {
        self.delete_group_impl(id).await
    }

    async fn assign_seat(&self, seat_id: &str, student_id: &str) -> Result<Vec<SeatingSeat>> {
        self.assign_seat_impl(seat_id, student_id).await
    }

    async fn unassign_seat(&self, seat_id: &str) -> Result<Option<SeatingSeat>> {
        self.unassign_seat_impl(seat_id).await
    }

    async fn apply_seat_plan(&self, chart_id: &str, plan: Vec<(String, String)>) -> Result<()> {
        self.apply_seat_plan_impl(chart_id, plan).await
    }

    async fn create_element(
        &self,
        chart_id: &str,
        element: NewRoomElement,
    ) -> Result<RoomElement> {
        self.create_element_impl(chart_id, element).await
    }

    async fn update_element(
        &self,
        id: &str,
        update: RoomElementUpdate,
    ) -> Result<Option<RoomElement>> {
        self.update_element_impl(id, update).await
    }

    async fn delete_element(&self, id: &str) -> Result<bool> {
        self.delete_element_impl(id).await
    }

    async fn replace_layout(&self, chart_id: &str, layout: &PresetLayout) -> Result<()> {
        self.replace_layout_impl(chart_id, layout).await
    }

    // 布局预设模块
    async fn list_presets(&self, user_id: &str) -> Result<Vec<LayoutPreset>> {
        self.list_presets_impl(user_id).await
    }

    async fn get_preset(&self, id: &str) -> Result<Option<LayoutPreset>> {
        self.get_preset_impl(id).await
    }

    async fn create_preset(
        &self,
        user_id: &str,
        name: &str,
        layout: &PresetLayout,
    ) -> Result<LayoutPreset> {
        self.create_preset_impl(user_id, name, layout).await
    }

    async fn rename_preset(&self, id: &str, name: &str) -> Result<Option<LayoutPreset>> {
        self.rename_preset_impl(id, name).await
    }

    async fn delete_preset(&self, id: &str) -> Result<bool> {
        self.delete_preset_impl(id).await
    }

    // 音效设置模块
    async fn get_sound_settings(&self, user_id: &str) -> Result<Option<SoundSettings>> {
        self.get_sound_settings_impl(user_id).await
    }

    async fn upsert_sound_settings(
        &self,
        user_id: &str,
        settings: SoundSettings,
    ) -> Result<SoundSettings> {
        self.upsert_sound_settings_impl(user_id, settings).await
    }

    // 旧版数据导入
    async fn import_legacy(&self, plan: LegacyImportPlan) -> Result<()> {
        self.import_legacy_impl(plan).await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| ClassPointsError::database_connection(format!("数据库不可用: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("data.db").unwrap(),
            "sqlite://data.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/cp").is_ok());
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }

    #[tokio::test]
    async fn test_in_memory_runs_migrations() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        storage.ping().await.unwrap();
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};

    /// 内存数据库加一个教师账号
    pub(crate) async fn storage_with_teacher() -> (SeaOrmStorage, String) {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let user_id = seed_teacher(&storage).await;
        (storage, user_id)
    }

    pub(crate) async fn seed_teacher(storage: &SeaOrmStorage) -> String {
        storage
            .create_user_impl(CreateUserRequest {
                username: "msfrizzle".to_string(),
                email: "frizzle@school.test".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Teacher,
                display_name: None,
            })
            .await
            .unwrap()
            .id
    }

    /// 在已有教师名下建班级和学生，返回 (班级 id, 学生 id)
    pub(crate) async fn seed_classroom(
        storage: &SeaOrmStorage,
        user_id: &str,
        names: &[&str],
    ) -> (String, Vec<String>) {
        let classroom = storage
            .create_classroom_impl(user_id, "Room 4B")
            .await
            .unwrap();
        let students = storage
            .create_students_impl(
                &classroom.id,
                names.iter().map(|n| n.to_string()).collect(),
            )
            .await
            .unwrap();
        (classroom.id, students.into_iter().map(|s| s.id).collect())
    }

    /// 教师、班级和若干学生，返回 (存储, 教师 id, 班级 id, 学生 id)
    pub(crate) async fn classroom_with_students(
        names: &[&str],
    ) -> (SeaOrmStorage, String, String, Vec<String>) {
        let (storage, user_id) = storage_with_teacher().await;
        let (classroom_id, ids) = seed_classroom(&storage, &user_id, names).await;
        (storage, user_id, classroom_id, ids)
    }
}
