use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::MappingCache;
use crate::storage::UrlMapping;

pub struct MokaMappingCache {
    inner: Cache<String, UrlMapping>,
}

impl MokaMappingCache {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        debug!(
            "MokaMappingCache initialized with max capacity: {}, TTL: {}s",
            max_capacity, ttl_secs
        );
        Self { inner }
    }
}

#[async_trait]
impl MappingCache for MokaMappingCache {
    async fn get(&self, id: &str) -> Option<UrlMapping> {
        self.inner.get(id).await
    }

    async fn insert(&self, id: &str, mapping: UrlMapping) {
        self.inner.insert(id.to_string(), mapping).await;
    }

    async fn remove(&self, id: &str) {
        self.inner.invalidate(id).await;
    }

    fn name(&self) -> &'static str {
        "moka"
    }
}
