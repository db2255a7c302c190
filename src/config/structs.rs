use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub argon2: Argon2Config,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub seating: SeatingConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub refresh_token_remember_me_expiry: i64,
}

/// Argon2 密码哈希参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost: u32, // KiB
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    pub redis: RedisConfig,
    pub memory: MemoryConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub pool_size: u64,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub max_age: usize,
}

/// 积分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    pub undo_window_secs: i64,      // 撤销窗口（秒）
    pub utc_offset_minutes: i32,    // 计算"今天"/"本周"时使用的时区偏移
    pub history_page_size: u64,     // 历史记录默认分页大小
    pub max_batch_size: usize,      // 单次批量奖励的学生上限
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            undo_window_secs: 10,
            utc_offset_minutes: 0,
            history_page_size: 50,
            max_batch_size: 200,
        }
    }
}

/// 座位表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatingConfig {
    pub default_canvas_width: f64,
    pub default_canvas_height: f64,
    pub default_grid_size: f64,
    pub max_groups: usize,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            default_canvas_width: 1600.0,
            default_canvas_height: 1200.0,
            default_grid_size: 40.0,
            max_groups: 26,
        }
    }
}

/// 实时推送配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    pub full_row_images: bool, // false 时 DELETE/UPDATE 的 old 仅包含主键
    pub channel_capacity: usize,
    pub heartbeat_interval_secs: u64,
    pub client_timeout_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            full_row_images: true,
            channel_capacity: 1024,
            heartbeat_interval_secs: 5,
            client_timeout_secs: 30,
        }
    }
}

/// 音效配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    pub sample_rate: u32,
    pub url_check_timeout_secs: u64,
    pub allowed_content_types: Vec<String>, // 不以 audio/ 开头但仍允许的类型
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            url_check_timeout_secs: 3,
            allowed_content_types: vec![
                "application/octet-stream".to_string(),
                "application/ogg".to_string(),
                "video/ogg".to_string(),
                "video/webm".to_string(),
            ],
        }
    }
}

/// 离线同步配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub probe_interval_secs: u64,
    pub max_queue: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: 5,
            max_queue: 1000,
        }
    }
}

/// 旧版数据迁移配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub block_on_orphans: bool, // 存在孤立记录时中止导入
}
