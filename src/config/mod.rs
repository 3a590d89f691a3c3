//! Configuration
//!
//! The whole configuration is loaded once at startup into an [`AppConfig`]
//! and handed to the components that need it.

mod structs;

pub use structs::*;
