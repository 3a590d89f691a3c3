//! Connection pool
//!
//! [`ConnectionPool`] owns the database pool for the whole process. It is
//! built once at startup from [`DatabaseConfig`] and shared through `Arc`.
//!
//! Admission is bounded: at most `pool_size` operations hold a connection
//! and at most `queue_limit` more wait for one. Anything beyond that fails
//! fast with `StoreUnavailable`. `queue_limit = 0` disables the bound and
//! lets callers wait up to the acquire timeout.

use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortUrlError};
use migration::{Migrator, MigratorTrait};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ShortUrlError::database_config(format!(
            "cannot infer database type from URL '{}'. Supported: sqlite:, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// Shared, bounded database pool.
pub struct ConnectionPool {
    db: DatabaseConnection,
    backend_name: String,
    admission: Option<Semaphore>,
}

/// One admitted slot on the pool, released when dropped.
///
/// Dereferences to the underlying connection so SeaORM calls can take it
/// directly.
pub struct PooledConnection<'a> {
    db: &'a DatabaseConnection,
    _permit: Option<SemaphorePermit<'a>>,
}

impl Deref for PooledConnection<'_> {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        self.db
    }
}

impl ConnectionPool {
    /// Connect, run migrations and set up admission control.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.connection_url()?;
        let backend_name = infer_backend_from_url(&database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(&database_url, config).await?
        } else {
            connect_generic(&database_url, &backend_name, config).await?
        };

        run_migrations(&db).await?;

        let pool = Self::from_connection(db, &backend_name, config);
        info!(
            "{} pool ready (pool_size={}, queue_limit={})",
            backend_name.to_uppercase(),
            config.pool_size,
            config.queue_limit
        );
        Ok(pool)
    }

    /// Wrap an already opened connection.
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        config: &DatabaseConfig,
    ) -> Self {
        let admission = (config.queue_limit > 0)
            .then(|| Semaphore::new((config.pool_size + config.queue_limit) as usize));

        Self {
            db,
            backend_name: backend_name.to_string(),
            admission,
        }
    }

    /// Take a slot for one logical store operation.
    pub fn acquire(&self, operation: &str) -> Result<PooledConnection<'_>> {
        let permit = match &self.admission {
            Some(semaphore) => match semaphore.try_acquire() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!("Connection queue full, rejecting {}", operation);
                    return Err(ShortUrlError::store_unavailable(
                        "connection pool and wait queue are full",
                    ));
                }
            },
            None => None,
        };

        debug!("Admitted {}", operation);
        Ok(PooledConnection {
            db: &self.db,
            _permit: permit,
        })
    }

    /// Free admission slots, `None` when the queue is unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.admission.as_ref().map(|s| s.available_permits())
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 检查数据库连通性
    pub async fn ping(&self) -> Result<()> {
        let conn = self.acquire("ping")?;
        conn.ping().await.map_err(ShortUrlError::from)
    }

    /// 关闭连接池
    pub async fn close(&self) {
        if let Err(e) = self.db.clone().close().await {
            warn!("Error while closing database pool: {}", e);
        }
    }
}

/// 连接 SQLite 数据库（带自动创建和性能优化）
pub async fn connect_sqlite(
    database_url: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    };

    let in_memory = database_url.contains(":memory:");

    let mut opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ShortUrlError::database_config(format!("invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .pragma("temp_store", "memory");
    if !in_memory {
        opt = opt
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    // 内存数据库每个连接都是独立的库，只能用一个连接
    let max_connections = if in_memory { 1 } else { config.pool_size };

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
    if in_memory {
        // 连接被回收时库也没了
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(opt)
        .await
        .map_err(|e| {
            ShortUrlError::database_config(format!("cannot connect to SQLite database: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接通用数据库（MySQL/PostgreSQL）
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    let pool_size = config.pool_size;

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(5))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        ShortUrlError::database_config(format!(
            "cannot connect to {} database: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ShortUrlError::database_config(format!("migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
