pub mod health;
pub mod redirect;
pub mod urls;

pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use urls::{UrlApiService, json_config, url_routes};

use actix_web::web;

/// 注册全部路由；短链跳转是兜底路由，必须放在最后
pub fn configure_routes(enable_redirect: bool) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config())
            .service(web::scope("/health").service(health_routes()))
            .service(web::scope("/api/urls").service(url_routes()));

        if enable_redirect {
            cfg.service(redirect_routes());
        }
    }
}
