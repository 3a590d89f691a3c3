use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortUrlError {
    InvalidInput(String),
    DuplicateId(String),
    NotFound(String),
    StoreUnavailable(String),
    DatabaseConfig(String),
    Config(String),
}

impl ShortUrlError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortUrlError::InvalidInput(_) => "E001",
            ShortUrlError::DuplicateId(_) => "E002",
            ShortUrlError::NotFound(_) => "E003",
            ShortUrlError::StoreUnavailable(_) => "E004",
            ShortUrlError::DatabaseConfig(_) => "E005",
            ShortUrlError::Config(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortUrlError::InvalidInput(_) => "Invalid Input",
            ShortUrlError::DuplicateId(_) => "Duplicate Id",
            ShortUrlError::NotFound(_) => "Resource Not Found",
            ShortUrlError::StoreUnavailable(_) => "Store Unavailable",
            ShortUrlError::DatabaseConfig(_) => "Database Configuration Error",
            ShortUrlError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortUrlError::InvalidInput(msg)
            | ShortUrlError::DuplicateId(msg)
            | ShortUrlError::NotFound(msg)
            | ShortUrlError::StoreUnavailable(msg)
            | ShortUrlError::DatabaseConfig(msg)
            | ShortUrlError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortUrlError {}

// 便捷的构造函数
impl ShortUrlError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::InvalidInput(msg.into())
    }

    pub fn duplicate_id<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DuplicateId(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::NotFound(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::StoreUnavailable(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::DatabaseConfig(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Config(msg.into())
    }
}

impl From<sea_orm::DbErr> for ShortUrlError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortUrlError::StoreUnavailable(err.to_string())
    }
}

impl From<config::ConfigError> for ShortUrlError {
    fn from(err: config::ConfigError) -> Self {
        ShortUrlError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortUrlError>;
