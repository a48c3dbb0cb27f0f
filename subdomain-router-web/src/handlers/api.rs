//! Management API.
//!
//! All endpoints are `GET` with query parameters.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use subdomain_router_core::CoreError;

use crate::app::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct AddPageQuery {
    pub name: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePageQuery {
    pub name: Option<String>,
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, CoreError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CoreError::MissingParameter(name))
}

/// `GET /api/records`: the reconciled record table.
pub async fn list_records(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.sites.list_records().await)
}

/// `GET /api/add_page?name=&target=`
pub async fn add_page(
    state: web::Data<AppState>,
    query: web::Query<AddPageQuery>,
) -> ApiResult<HttpResponse> {
    let name = required(query.name.as_deref(), "name")?;
    let target = required(query.target.as_deref(), "target")?;

    let record = state.sites.add_record(name, target).await?;
    tracing::info!("Added page {name} -> {target}");
    Ok(HttpResponse::Ok().json(json!({
        "status": "added",
        "name": name,
        "target": target,
        "record": record,
    })))
}

/// `GET /api/delete_page?name=`
pub async fn delete_page(
    state: web::Data<AppState>,
    query: web::Query<DeletePageQuery>,
) -> ApiResult<HttpResponse> {
    let name = required(query.name.as_deref(), "name")?;

    let removed = state.sites.delete_record(name).await?;
    tracing::info!("Deleted page {}", removed.name);
    Ok(HttpResponse::Ok().json(json!({
        "status": "deleted",
        "name": removed.name,
    })))
}

/// `GET /api/reload_sites`: re-read the registry file.
pub async fn reload_sites(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let sites = state.sites.reload_registry().await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "reloaded",
        "sites": sites,
    })))
}

/// `GET /api/save_sites`: write the registry file now.
pub async fn save_sites(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    state.sites.save_registry().await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "saved" })))
}
