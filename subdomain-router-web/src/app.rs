//! Application state and route table.

use std::sync::Arc;

use actix_web::{guard, web};
use subdomain_router_core::SiteService;
use subdomain_router_core::resolver::is_root_host;

use crate::config::MatrixConfig;
use crate::handlers::{api, redirect, request_host, well_known};

/// Shared by every worker.
pub struct AppState {
    pub sites: Arc<SiteService>,
    pub root_domain: String,
    pub matrix: Option<MatrixConfig>,
}

/// Register all routes.
///
/// Management and well-known endpoints answer on the root domain only; every
/// other request goes to the redirect resolver. Both sides read the host from
/// [`request_host`].
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let root_domain = state.root_domain.clone();
        let mut root = web::scope("")
            .guard(guard::fn_guard(move |ctx| {
                is_root_host(request_host(ctx.head()), &root_domain)
            }))
            .route("/api/records", web::get().to(api::list_records))
            .route("/api/add_page", web::get().to(api::add_page))
            .route("/api/delete_page", web::get().to(api::delete_page))
            .route("/api/reload_sites", web::get().to(api::reload_sites))
            .route("/api/save_sites", web::get().to(api::save_sites));

        if state.matrix.is_some() {
            root = root
                .route("/.well-known/matrix/server", web::get().to(well_known::matrix_server))
                .route("/.well-known/matrix/client", web::get().to(well_known::matrix_client));
        }

        cfg.app_data(state)
            .service(root)
            .default_service(web::to(redirect::visit));
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "app_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;
