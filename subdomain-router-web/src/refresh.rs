//! Periodic registry refresh: `git pull`, then reload.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use subdomain_router_core::SiteService;
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::config::RefreshConfig;

/// Start the refresh loop. The first run happens one interval after startup.
pub fn spawn(config: RefreshConfig, sites: Arc<SiteService>) -> JoinHandle<()> {
    let period = Duration::from_secs(config.interval_secs.max(1));
    tracing::info!(
        "Registry refresh every {}s from {}",
        period.as_secs(),
        config.repo_dir.display()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh_once(&config.repo_dir, &sites).await;
        }
    })
}

/// Pull the repository and reload the registry. Failures keep the previous state.
pub async fn refresh_once(repo_dir: &Path, sites: &SiteService) {
    tracing::info!("Running git pull...");
    match Command::new("git")
        .arg("pull")
        .current_dir(repo_dir)
        .output()
        .await
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stdout.trim().is_empty() {
                tracing::info!("git pull: {}", stdout.trim());
            }
            if !stderr.trim().is_empty() {
                tracing::warn!("git pull errors: {}", stderr.trim());
            }
            if !output.status.success() {
                tracing::warn!("git pull exited with {}", output.status);
            }
        }
        Err(e) => tracing::error!("Failed to run git pull: {e}"),
    }

    match sites.reload_registry().await {
        Ok(reloaded) => tracing::info!("Reloaded {} sites after git pull", reloaded.len()),
        Err(e) => tracing::error!("Reload after git pull failed, keeping previous sites: {e}"),
    }
}
