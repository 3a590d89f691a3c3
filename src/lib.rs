//! shorturl - a small URL shortener service
//!
//! Maps client chosen short ids to long URLs and resolves them back,
//! counting visits with an atomic per-row increment.
//!
//! # Architecture
//! - `storage`: connection pool, retry and the mapping store
//! - `cache`: optional read-through mapping cache
//! - `services`: create / resolve flows
//! - `api`: HTTP handlers and middleware
//! - `config`: configuration loading
//! - `runtime`: application lifecycle
//! - `system`: logging setup

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
