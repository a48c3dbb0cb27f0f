//! HTTP handlers

pub mod api;
pub mod redirect;
pub mod well_known;

use actix_web::dev::RequestHead;
use actix_web::http::header;
use actix_web::http::uri::Authority;

/// Host a request was addressed to: the `Host` header, or the URI authority
/// for HTTP/2. Forwarding headers are not consulted.
pub fn request_host(head: &RequestHead) -> &str {
    head.headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| head.uri.authority().map(Authority::as_str))
        .unwrap_or_default()
}
