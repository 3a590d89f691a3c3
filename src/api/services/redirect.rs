//! 服务端跳转
//!
//! `GET /{id}` 走和 `/api/urls/{id}` 相同的解析流程（计数加一），然后 307 跳转。

use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, error, trace};

use crate::errors::ShortUrlError;
use crate::services::UrlService;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        service: web::Data<UrlService>,
    ) -> impl Responder {
        let id = path.into_inner();
        trace!("Redirect request for {}", id);

        match service.resolve(&id).await {
            Ok(original_url) => {
                debug!("Redirecting {} to {}", id, original_url);
                HttpResponse::TemporaryRedirect()
                    .insert_header(("Location", original_url))
                    .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
                    .finish()
            }
            Err(ShortUrlError::NotFound(_)) => Self::not_found_response(),
            Err(e) => {
                error!("Redirect failed for {}: {}", id, e);
                HttpResponse::InternalServerError()
                    .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                    .body("Internal Server Error")
            }
        }
    }

    fn not_found_response() -> HttpResponse {
        HttpResponse::NotFound()
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Not Found")
    }
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{id}", web::get().to(RedirectService::handle_redirect))
}
