//! 存储层
//!
//! - [`pool`]: 连接池与准入控制
//! - [`store`]: 映射的增查与计数
//! - [`retry`]: 瞬时故障重试

pub mod models;
pub mod pool;
pub mod retry;
pub mod store;

pub use models::UrlMapping;
pub use pool::{ConnectionPool, PooledConnection, infer_backend_from_url};
pub use retry::RetryConfig;
pub use store::MappingStore;
