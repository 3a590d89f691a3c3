//! 映射缓存
//!
//! id 和 original_url 写入后不再变化，也没有删除操作，所以命中的映射可以直接复用。
//! 只缓存已存在的映射，不做负缓存，新建的 id 立刻可见。

mod moka;
mod null;
mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::CacheConfig;

pub use self::moka::MokaMappingCache;
pub use null::NullMappingCache;
pub use traits::MappingCache;

/// 按配置创建缓存实现
pub fn build_cache(config: &CacheConfig) -> Arc<dyn MappingCache> {
    if config.enabled {
        info!(
            "Mapping cache enabled (capacity={}, ttl={}s)",
            config.max_capacity, config.ttl_secs
        );
        Arc::new(MokaMappingCache::new(config.max_capacity, config.ttl_secs))
    } else {
        info!("Mapping cache disabled");
        Arc::new(NullMappingCache)
    }
}
