use async_trait::async_trait;
use tracing::trace;

use super::MappingCache;
use crate::storage::UrlMapping;

/// 关闭缓存时使用，所有读取都未命中
pub struct NullMappingCache;

#[async_trait]
impl MappingCache for NullMappingCache {
    async fn get(&self, id: &str) -> Option<UrlMapping> {
        trace!("NullMappingCache.get called for id: {}", id);
        None
    }

    async fn insert(&self, id: &str, _: UrlMapping) {
        trace!("NullMappingCache.insert called for id: {}", id);
    }

    async fn remove(&self, id: &str) {
        trace!("NullMappingCache.remove called for id: {}", id);
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
