//! Server mode
//!
//! Builds the actix-web application and runs it until a shutdown signal.

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::configure_routes;
use crate::api::middleware::RequestIdMiddleware;
use crate::api::middleware::request_id::REQUEST_ID_HEADER;
use crate::api::services::AppStartTime;
use crate::config::{AppConfig, CorsConfig};
use crate::runtime::{shutdown, startup};

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if cors_config.enabled && cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }
}

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 关闭时沿用浏览器同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "POST", "HEAD", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .allowed_header(REQUEST_ID_HEADER)
        .expose_headers(vec![REQUEST_ID_HEADER])
        .max_age(cors_config.max_age)
}

/// Run the HTTP server
///
/// Logging must be initialized before calling this function.
pub async fn run_server(config: AppConfig) -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = startup::prepare_server_startup(&config).await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let url_service = web::Data::from(startup.url_service.clone());
    let pool = startup.pool.clone();

    let server_config = config.server.clone();
    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let workers = server_config.workers.clamp(1, 32);
    warn!("Using {} workers for the server", workers);

    let enable_redirect = server_config.enable_redirect;
    let bind_address = format!("{}:{}", server_config.host, server_config.port);
    let server_data = web::Data::new(server_config);

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(url_service.clone())
            .app_data(server_data.clone())
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(configure_routes(enable_redirect))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(workers)
    .disable_signals();

    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res.context("HTTP server stopped with an error")?;
            pool.close().await;
        }
        _ = shutdown::listen_for_shutdown(&pool) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
