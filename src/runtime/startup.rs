use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache;
use crate::config::AppConfig;
use crate::services::UrlService;
use crate::storage::{ConnectionPool, MappingStore, RetryConfig};
use crate::utils::IdPolicy;

pub struct StartupContext {
    pub pool: Arc<ConnectionPool>,
    pub url_service: Arc<UrlService>,
}

/// 准备服务器启动的上下文：连接池、缓存、存储和服务
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let pool = ConnectionPool::connect(&config.database)
        .await
        .context("Failed to create connection pool")?;
    let pool = Arc::new(pool);
    info!("Using storage backend: {}", pool.backend_name());

    let cache = cache::build_cache(&config.cache);

    let store = MappingStore::new(
        pool.clone(),
        cache,
        RetryConfig::from(&config.database),
        IdPolicy::from(&config.validation),
    );

    let url_count = store
        .count()
        .await
        .context("Failed to read initial mapping count")?;
    info!("{} mappings in store", url_count);

    let url_service = Arc::new(UrlService::new(Arc::new(store)));

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());
    Ok(StartupContext { pool, url_service })
}
