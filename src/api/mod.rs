pub mod middleware;
pub mod services;
pub mod types;

pub use services::configure_routes;
