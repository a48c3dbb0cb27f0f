//! Matrix delegation documents.

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::app::AppState;

/// `GET /.well-known/matrix/server`
pub async fn matrix_server(state: web::Data<AppState>) -> HttpResponse {
    match &state.matrix {
        Some(matrix) => HttpResponse::Ok().json(json!({ "m.server": matrix.server })),
        None => HttpResponse::NotFound().finish(),
    }
}

/// `GET /.well-known/matrix/client`
pub async fn matrix_client(state: web::Data<AppState>) -> HttpResponse {
    match &state.matrix {
        Some(matrix) => HttpResponse::Ok().json(json!({
            "m.homeserver": { "base_url": matrix.homeserver_base_url }
        })),
        None => HttpResponse::NotFound().finish(),
    }
}
