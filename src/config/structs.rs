use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{Result, ShortUrlError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 应用配置（从 TOML 加载，启动时构建一次并显式传递）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - database: 连接参数与连接池
/// - cache: 目标 URL 读缓存
/// - cors: 跨域策略
/// - validation: 短 id 的校验策略
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：SU，分隔符：__
    /// 示例：SU__SERVER__PORT=9999
    pub fn load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(ShortUrlError::config("database.pool_size must be at least 1"));
        }
        if self.validation.max_id_length == 0 || self.validation.max_id_length > MAX_ID_COLUMN_LENGTH
        {
            return Err(ShortUrlError::config(format!(
                "validation.max_id_length must be between 1 and {}",
                MAX_ID_COLUMN_LENGTH
            )));
        }
        if self.server.workers == 0 {
            return Err(ShortUrlError::config("server.workers must be at least 1"));
        }
        Ok(())
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Width of the `urls.id` column.
pub const MAX_ID_COLUMN_LENGTH: usize = 64;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// 启用 `GET /{id}` 服务端跳转
    #[serde(default = "default_true")]
    pub enable_redirect: bool,
    /// 使用 X-Forwarded-For 的第一个地址作为 creator_origin
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

/// 数据库连接配置
///
/// `url` 非空时直接使用；否则由 driver/host/port/user/password/database 拼出连接串。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_database_host")]
    pub host: String,
    #[serde(default = "default_database_port")]
    pub port: u16,
    #[serde(default = "default_database_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database_name")]
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// 连接池占满后允许排队的请求数，0 表示不限
    #[serde(default)]
    pub queue_limit: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl DatabaseConfig {
    /// `url` 非空时被忽略、但又改过默认值的连接参数
    pub fn ignored_connection_parts(&self) -> Vec<&'static str> {
        if self.url.trim().is_empty() {
            return Vec::new();
        }

        [
            ("driver", self.driver != default_driver()),
            ("host", self.host != default_database_host()),
            ("port", self.port != default_database_port()),
            ("user", self.user != default_database_user()),
            ("password", !self.password.is_empty()),
            ("database", self.database != default_database_name()),
        ]
        .into_iter()
        .filter_map(|(name, changed)| changed.then_some(name))
        .collect()
    }

    /// 最终使用的连接串
    pub fn connection_url(&self) -> Result<String> {
        if !self.url.trim().is_empty() {
            let ignored = self.ignored_connection_parts();
            if !ignored.is_empty() {
                warn!(
                    "database.url is set, ignoring database.{}; clear database.url to build the URL from parts",
                    ignored.join(", database.")
                );
            }
            return Ok(self.url.trim().to_string());
        }

        let base = format!("{}://{}", self.driver, self.host);
        let mut url = url::Url::parse(&base).map_err(|e| {
            ShortUrlError::database_config(format!("invalid database host '{}': {}", self.host, e))
        })?;

        let parts_ok = url.set_port(Some(self.port)).is_ok()
            && url.set_username(&self.user).is_ok()
            && url
                .set_password((!self.password.is_empty()).then_some(self.password.as_str()))
                .is_ok();
        if !parts_ok {
            return Err(ShortUrlError::database_config(format!(
                "cannot build a {} connection URL for host '{}'",
                self.driver, self.host
            )));
        }
        url.set_path(&self.database);

        Ok(url.to_string())
    }
}

/// 目标 URL 读缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

/// 短 id 校验策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// true: 只接受 [A-Za-z0-9_-]；false: 接受任意可放入路径段的字符
    #[serde(default = "default_true")]
    pub strict_ids: bool,
    #[serde(default = "default_max_id_length")]
    pub max_id_length: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3001
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://urls.db?mode=rwc".to_string()
}

fn default_driver() -> String {
    "mysql".to_string()
}

fn default_database_host() -> String {
    "localhost".to_string()
}

fn default_database_port() -> u16 {
    3306
}

fn default_database_user() -> String {
    "root".to_string()
}

fn default_database_name() -> String {
    "url_shortener".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_max_id_length() -> usize {
    MAX_ID_COLUMN_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
            enable_redirect: true,
            trust_forwarded_for: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            driver: default_driver(),
            host: default_database_host(),
            port: default_database_port(),
            user: default_database_user(),
            password: String::new(),
            database: default_database_name(),
            pool_size: default_pool_size(),
            queue_limit: 0,
            acquire_timeout_secs: default_acquire_timeout_secs(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_allowed_origins(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_ids: true,
            max_id_length: default_max_id_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
