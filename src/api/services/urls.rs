//! `/api/urls` handlers

use actix_web::error::InternalError;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error, trace};

use crate::api::types::{
    CreateUrlBody, ErrorResponse, MSG_CREATE_FAILED, MSG_DUPLICATE_ID, MSG_FETCH_FAILED,
    MSG_INVALID_INPUT, MSG_NOT_FOUND, OriginalUrlResponse, SuccessResponse,
};
use crate::config::ServerConfig;
use crate::errors::ShortUrlError;
use crate::services::{CreateUrlRequest, UrlService};
use crate::utils::extract_client_ip;

pub struct UrlApiService;

impl UrlApiService {
    pub async fn create_url(
        req: HttpRequest,
        body: web::Json<CreateUrlBody>,
        service: web::Data<UrlService>,
        server: web::Data<ServerConfig>,
    ) -> impl Responder {
        let body = body.into_inner();
        let creator_origin = extract_client_ip(&req, server.trust_forwarded_for);
        trace!("Create request for id {:?} from {:?}", body.id, creator_origin);

        let result = service
            .create(CreateUrlRequest {
                id: body.id,
                url: body.url,
                creator_origin,
            })
            .await;

        match result {
            Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
            Err(e) => Self::create_error_response(&e),
        }
    }

    pub async fn get_url(
        path: web::Path<String>,
        service: web::Data<UrlService>,
    ) -> impl Responder {
        let id = path.into_inner();

        match service.resolve(&id).await {
            Ok(original_url) => HttpResponse::Ok().json(OriginalUrlResponse { original_url }),
            Err(e) => Self::fetch_error_response(&id, &e),
        }
    }

    /// `/api/urls` 下无法匹配的路径，例如带 `/` 的 id
    pub async fn unknown_route() -> impl Responder {
        HttpResponse::NotFound().json(ErrorResponse::new(MSG_NOT_FOUND))
    }

    fn create_error_response(err: &ShortUrlError) -> HttpResponse {
        match err {
            ShortUrlError::InvalidInput(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::new(MSG_INVALID_INPUT))
            }
            ShortUrlError::DuplicateId(_) => {
                HttpResponse::Conflict().json(ErrorResponse::new(MSG_DUPLICATE_ID))
            }
            other => {
                error!("Create failed: {}", other);
                HttpResponse::InternalServerError().json(ErrorResponse::new(MSG_CREATE_FAILED))
            }
        }
    }

    fn fetch_error_response(id: &str, err: &ShortUrlError) -> HttpResponse {
        match err {
            ShortUrlError::NotFound(_) => {
                debug!("URL not found: {}", id);
                HttpResponse::NotFound().json(ErrorResponse::new(MSG_NOT_FOUND))
            }
            other => {
                error!("Fetch failed for {}: {}", id, other);
                HttpResponse::InternalServerError().json(ErrorResponse::new(MSG_FETCH_FAILED))
            }
        }
    }
}

/// 请求体解析失败（非 JSON、缺字段、类型不对）统一返回 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            debug!("Rejected malformed create body: {}", err);
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ErrorResponse::new(MSG_INVALID_INPUT)),
            )
            .into()
        })
}

pub fn url_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::post().to(UrlApiService::create_url))
        .route("/{id}", web::get().to(UrlApiService::get_url))
        .default_service(web::to(UrlApiService::unknown_route))
}
