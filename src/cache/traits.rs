use async_trait::async_trait;

use crate::storage::UrlMapping;

#[async_trait]
pub trait MappingCache: Send + Sync {
    async fn get(&self, id: &str) -> Option<UrlMapping>;
    async fn insert(&self, id: &str, mapping: UrlMapping);
    async fn remove(&self, id: &str);

    fn name(&self) -> &'static str;
}
