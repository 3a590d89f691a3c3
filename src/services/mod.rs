//! Service layer for business logic
//!
//! Request flows shared by the HTTP handlers: input checks at the boundary,
//! then a single call into the mapping store.

mod url_service;

pub use url_service::*;
