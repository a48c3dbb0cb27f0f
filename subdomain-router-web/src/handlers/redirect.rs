//! Subdomain redirects and the root index page.

use std::fmt::Write;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use subdomain_router_core::types::SiteEntry;
use subdomain_router_core::{CoreError, Resolution};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::request_host;

/// Default service: every request that is not a management call.
pub async fn visit(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let host = request_host(req.head()).to_owned();

    match state.sites.resolve(&host, req.path()).await {
        Ok(Resolution::Redirect(location)) => {
            tracing::debug!("{host}{} -> {location}", req.path());
            HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish()
        }
        Ok(Resolution::Index) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_index(&state.root_domain, &state.sites.list_sites().await)),
        Err(CoreError::SubdomainNotFound(sub)) => {
            tracing::debug!("No site for '{sub}' ({host})");
            HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body("Subdomain not found")
        }
        Err(e) => actix_web::ResponseError::error_response(&ApiError::from(e)),
    }
}

fn render_index(root_domain: &str, sites: &[SiteEntry]) -> String {
    let root = escape_html(root_domain);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{root}</title></head>\n<body>\n<h1>{root}</h1>\n<ul>\n"
    );
    for site in sites {
        let _ = writeln!(
            html,
            "<li><a href=\"//{name}/\">{name}</a> &rarr; {target}</li>",
            name = escape_html(&site.name),
            target = escape_html(&site.target),
        );
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
