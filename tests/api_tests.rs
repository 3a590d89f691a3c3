//! HTTP API tests
//!
//! Drives the full actix-web application against a temporary SQLite store.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};

use shorturl::api::configure_routes;
use shorturl::api::middleware::RequestIdMiddleware;
use shorturl::api::services::AppStartTime;
use shorturl::config::AppConfig;
use shorturl::runtime::{StartupContext, prepare_server_startup};
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

async fn create_test_context() -> (AppConfig, StartupContext, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("api_test.db");

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}?mode=rwc", db_path.display());
    config.server.enable_redirect = true;

    let ctx = prepare_server_startup(&config)
        .await
        .expect("Failed to prepare startup");
    (config, ctx, temp_dir)
}

macro_rules! init_app {
    ($config:expr, $ctx:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::from($ctx.url_service.clone()))
                .app_data(web::Data::new($config.server.clone()))
                .app_data(web::Data::new(AppStartTime::now()))
                .configure(configure_routes($config.server.enable_redirect)),
        )
        .await
    };
}

fn create_request(body: Value) -> TestRequest {
    TestRequest::post().uri("/api/urls").set_json(body)
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[actix_web::test]
    async fn test_create_resolve_and_miss() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let resp = test::call_service(
            &app,
            create_request(json!({ "id": "abc123", "url": "https://example.com/page" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": true }));

        let req = TestRequest::get().uri("/api/urls/abc123").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "original_url": "https://example.com/page" }));

        let mapping = ctx
            .url_service
            .store()
            .peek("abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.visit_count, 1);

        let req = TestRequest::get().uri("/api/urls/zzz999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "URL not found" }));
    }

    #[actix_web::test]
    async fn test_read_body_hides_audit_fields() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let req = TestRequest::post()
            .uri("/api/urls")
            .peer_addr("203.0.113.9:4000".parse().unwrap())
            .set_json(json!({ "id": "audit", "url": "https://example.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let stored = ctx
            .url_service
            .store()
            .peek("audit")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.creator_origin.as_deref(), Some("203.0.113.9"));

        let req = TestRequest::get().uri("/api/urls/audit").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let fields: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(fields, vec!["original_url"]);
    }
}

// =============================================================================
// Create errors
// =============================================================================

#[cfg(test)]
mod create_error_tests {
    use super::*;

    #[actix_web::test]
    async fn test_duplicate_is_conflict() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let body = json!({ "id": "dup", "url": "https://example.com/1" });
        let resp = test::call_service(&app, create_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json!({ "id": "dup", "url": "https://example.com/2" });
        let resp = test::call_service(&app, create_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "URL id already exists" }));
    }

    #[actix_web::test]
    async fn test_invalid_input_is_bad_request() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        for body in [
            json!({ "id": "", "url": "https://example.com" }),
            json!({ "id": "ok", "url": "ftp://example.com" }),
            json!({ "id": "ok", "url": "javascript:alert(1)" }),
            json!({ "id": "bad id", "url": "https://example.com" }),
            json!({ "id": "ok" }),
            json!({ "id": 7, "url": "https://example.com" }),
        ] {
            let resp = test::call_service(&app, create_request(body.clone()).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            let resp_body: Value = test::read_body_json(resp).await;
            assert_eq!(resp_body, json!({ "error": "Invalid URL or id" }));
        }

        assert_eq!(ctx.url_service.store().count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_padded_url_is_bad_request() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let body = json!({ "id": "padded", "url": "  https://example.com/x  " });
        let resp = test::call_service(&app, create_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp_body: Value = test::read_body_json(resp).await;
        assert_eq!(resp_body, json!({ "error": "Invalid URL or id" }));

        assert!(ctx.url_service.store().peek("padded").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_store_failure_is_server_error() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let body = json!({ "id": "before", "url": "https://example.com" });
        let resp = test::call_service(&app, create_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        ctx.pool.close().await;

        let req = TestRequest::get().uri("/api/urls/before").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp_body: Value = test::read_body_json(resp).await;
        assert_eq!(resp_body, json!({ "error": "Failed to fetch URL" }));

        let body = json!({ "id": "after", "url": "https://example.com" });
        let resp = test::call_service(&app, create_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp_body: Value = test::read_body_json(resp).await;
        assert_eq!(resp_body, json!({ "error": "Failed to create URL" }));
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let req = TestRequest::post()
            .uri("/api/urls")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid URL or id" }));
    }
}

// =============================================================================
// Redirect, health and request id
// =============================================================================

#[cfg(test)]
mod extra_route_tests {
    use super::*;

    #[actix_web::test]
    async fn test_redirect_counts_visit() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let body = json!({ "id": "go", "url": "https://example.com/target" });
        assert_eq!(
            test::call_service(&app, create_request(body).to_request()).await.status(),
            StatusCode::OK
        );

        let resp = test::call_service(&app, TestRequest::get().uri("/go").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://example.com/target"
        );

        let resp = test::call_service(&app, TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers().get("Cache-Control").unwrap(), "no-store");

        let mapping = ctx.url_service.store().peek("go").await.unwrap().unwrap();
        assert_eq!(mapping.visit_count, 1);
    }

    #[actix_web::test]
    async fn test_redirect_disabled() {
        let (mut config, ctx, _dir) = create_test_context().await;
        config.server.enable_redirect = false;
        let app = init_app!(config, ctx);

        let resp = test::call_service(&app, TestRequest::get().uri("/go").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health_endpoints() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"]["backend"], "sqlite");
        assert_eq!(body["storage"]["urls_count"], 0);

        let resp =
            test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp =
            test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_every_response_has_request_id() {
        let (config, ctx, _dir) = create_test_context().await;
        let app = init_app!(config, ctx);

        for uri in ["/api/urls/missing", "/health/live", "/missing"] {
            let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
            assert!(resp.headers().contains_key("x-request-id"), "uri: {}", uri);
        }
    }
}
