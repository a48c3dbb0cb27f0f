//! subdomain-router entry point
//!
//! Startup order: config, logging, self IP, provider, registry load,
//! reconciliation, HTTP server. When the server stops (SIGINT/SIGTERM), the
//! registry is written back once.

mod app;
mod config;
mod error;
mod handlers;
mod logging;
mod refresh;

use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use subdomain_router_core::adapters::JsonFileRegistryStore;
use subdomain_router_core::services::discover_self_ip;
use subdomain_router_core::{ReconcileService, ServiceContext, SiteService, ZoneSettings};
use subdomain_router_provider::CloudflareProvider;

use crate::app::AppState;
use crate::config::Config;

#[actix_web::main]
async fn main() -> ExitCode {
    let config = match Config::load(&Config::path_from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting subdomain-router for {}", config.domain.root);

    let self_ip = resolve_self_ip(&config).await?;

    let provider = Arc::new(CloudflareProvider::new(config.cloudflare.api_token.clone()));
    let registry_store = Arc::new(JsonFileRegistryStore::new(config.registry.path.clone()));
    let ctx = Arc::new(ServiceContext::new(
        provider,
        registry_store,
        ZoneSettings {
            zone_id: config.cloudflare.zone_id.clone(),
            root_domain: config.domain.root.clone(),
            call_timeout: config.provider.call_timeout(),
        },
        self_ip.to_string(),
    ));

    let sites = Arc::new(SiteService::new(Arc::clone(&ctx)));
    sites
        .load_registry()
        .await
        .with_context(|| format!("failed to load {}", config.registry.path.display()))?;

    let report = ReconcileService::new(Arc::clone(&ctx))
        .reconcile()
        .await
        .context("startup reconciliation aborted")?;
    tracing::info!(
        "Reconciled {} sites ({} failed)",
        report.outcomes.len(),
        report.failed()
    );

    let refresh_task = config
        .refresh
        .enabled
        .then(|| refresh::spawn(config.refresh.clone(), Arc::clone(&sites)));

    let state = web::Data::new(AppState {
        sites: Arc::clone(&sites),
        root_domain: config.domain.root.clone(),
        matrix: config.matrix.clone(),
    });

    let workers = config.server.worker_count();
    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!("Listening on {}:{} with {workers} workers", bind.0, bind.1);

    let served = match HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(app::configure(state.clone()))
    })
    .workers(workers)
    .bind(&bind)
    {
        Ok(server) => server.run().await.context("HTTP server failed"),
        Err(e) => Err(e).with_context(|| format!("failed to bind {}:{}", bind.0, bind.1)),
    };

    if let Some(task) = refresh_task {
        task.abort();
    }

    tracing::info!("Shutting down, saving registry");
    sites
        .save_registry()
        .await
        .context("failed to save registry on shutdown")?;
    tracing::info!("Saved {}", config.registry.path.display());

    served
}

async fn resolve_self_ip(config: &Config) -> anyhow::Result<Ipv4Addr> {
    if let Some(ip) = &config.self_ip.override_ip {
        let ip = ip
            .trim()
            .parse()
            .with_context(|| format!("[self_ip].override '{ip}' is not an IPv4 address"))?;
        tracing::info!("Using configured public IP {ip}");
        return Ok(ip);
    }
    Ok(discover_self_ip(&config.self_ip.lookup_url).await?)
}
