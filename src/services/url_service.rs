//! URL resolution service
//!
//! Create flow: received, validated, stored, acknowledged (or rejected).
//! Resolve flow: received, looked up and touched, returned (or not found).

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::errors::ShortUrlError;
use crate::storage::MappingStore;
use crate::utils::{is_redirectable, validate_url};

// ============ Request DTOs ============

/// Request to register a new mapping
#[derive(Debug, Clone)]
pub struct CreateUrlRequest {
    /// Client generated short id
    pub id: String,
    /// Target URL, http or https only
    pub url: String,
    /// Client address recorded for audit
    pub creator_origin: Option<String>,
}

// ============ UrlService Implementation ============

/// Stateless service wrapping the mapping store.
pub struct UrlService {
    store: Arc<MappingStore>,
}

impl UrlService {
    pub fn new(store: Arc<MappingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Validate at the boundary and store the mapping.
    ///
    /// Returns `InvalidInput` before touching the store, `DuplicateId` when
    /// the id is taken and `StoreUnavailable` on I/O trouble.
    pub async fn create(&self, req: CreateUrlRequest) -> Result<(), ShortUrlError> {
        let id = req.id.as_str();
        let url = req.url.as_str();

        if let Err(e) = self.store.id_policy().validate(id) {
            debug!("Rejected create, bad id {:?}: {}", id, e);
            return Err(ShortUrlError::invalid_input(e.to_string()));
        }
        if let Err(e) = validate_url(url) {
            debug!("Rejected create for {}, bad url: {}", id, e);
            return Err(ShortUrlError::invalid_input(e.to_string()));
        }

        self.store
            .create(id, url, req.creator_origin.as_deref())
            .await?;

        info!("Short URL registered: {} -> {}", id, url);
        Ok(())
    }

    /// Resolve an id to its target URL, counting one visit.
    pub async fn resolve(&self, id: &str) -> Result<String, ShortUrlError> {
        let mapping = self.store.resolve_and_touch(id).await?;

        // 交出去之前再确认一次协议
        if !is_redirectable(&mapping.original_url) {
            error!(
                "Stored target for {} has a non-http(s) scheme, refusing to return it",
                id
            );
            return Err(ShortUrlError::store_unavailable("stored URL failed validation"));
        }

        debug!("Resolved {} (visits={})", id, mapping.visit_count);
        Ok(mapping.original_url)
    }
}
