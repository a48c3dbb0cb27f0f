//! Configuration loading.
//!
//! Every section is optional; a missing file means all defaults. Secrets and
//! deployment values can be supplied through the environment instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "SUBDOMAIN_ROUTER_CONFIG";
const TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";
const ZONE_ENV: &str = "CLOUDFLARE_ZONE_ID";
const PORT_ENV: &str = "SUBDOMAIN_ROUTER_PORT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub domain: DomainConfig,
    pub cloudflare: CloudflareConfig,
    pub registry: RegistryConfig,
    pub provider: ProviderConfig,
    pub self_ip: SelfIpConfig,
    pub refresh: RefreshConfig,
    pub log: LogConfig,
    /// Matrix well-known documents; served only when present.
    pub matrix: Option<MatrixConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; `0` means one per CPU.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5678,
            workers: 0,
        }
    }
}

impl ServerConfig {
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Apex domain every site lives under.
    pub root: String,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            root: "is-chronically.online".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CloudflareConfig {
    pub api_token: String,
    pub zone_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sites.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Upper bound on each provider call, in seconds.
    pub call_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 15,
        }
    }
}

impl ProviderConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelfIpConfig {
    pub lookup_url: String,
    /// Skip the lookup and use this address.
    #[serde(rename = "override")]
    pub override_ip: Option<String>,
}

impl Default for SelfIpConfig {
    fn default() -> Self {
        Self {
            lookup_url: "https://ipinfo.io/".to_string(),
            override_ip: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Git checkout holding the registry file.
    pub repo_dir: PathBuf,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 600,
            repo_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
    /// Also write daily-rotated files here.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    /// `m.server` value, e.g. `matrix.example.com:443`.
    pub server: String,
    /// `m.homeserver.base_url` value.
    pub homeserver_base_url: String,
}

impl Config {
    /// Config path from the first CLI argument, then the environment.
    pub fn path_from_env() -> PathBuf {
        std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Read `path` (if it exists), apply environment overrides and validate.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(token) = var(TOKEN_ENV) {
            self.cloudflare.api_token = token;
        }
        if let Some(zone) = var(ZONE_ENV) {
            self.cloudflare.zone_id = zone;
        }
        if let Some(port) = var(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{PORT_ENV}='{port}' is not a port number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cloudflare.api_token.trim().is_empty() {
            bail!("Cloudflare API token is not set ([cloudflare].api_token or {TOKEN_ENV})");
        }
        if self.cloudflare.zone_id.trim().is_empty() {
            bail!("Cloudflare zone id is not set ([cloudflare].zone_id or {ZONE_ENV})");
        }
        if self.domain.root.trim().is_empty() {
            bail!("[domain].root must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5678);
        assert_eq!(config.registry.path, PathBuf::from("sites.json"));
        assert_eq!(config.self_ip.lookup_url, "https://ipinfo.io/");
        assert!(!config.refresh.enabled);
        assert!(config.matrix.is_none());
        assert!(config.server.worker_count() >= 1);
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080
            workers = 2

            [domain]
            root = "example.com"

            [self_ip]
            override = "203.0.113.1"

            [log]
            format = "json"

            [matrix]
            server = "matrix.example.com:443"
            homeserver_base_url = "https://matrix.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.worker_count(), 2);
        assert_eq!(config.domain.root, "example.com");
        assert_eq!(config.self_ip.override_ip.as_deref(), Some("203.0.113.1"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.matrix.unwrap().server, "matrix.example.com:443");
    }

    #[test]
    fn test_env_overrides_and_validation() {
        let env: HashMap<&str, &str> = HashMap::from([
            (TOKEN_ENV, "tok"),
            (ZONE_ENV, "zone"),
            (PORT_ENV, "9000"),
        ]);
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.cloudflare.api_token, "tok");
        assert_eq!(config.cloudflare.zone_id, "zone");
        assert_eq!(config.server.port, 9000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::default();
        assert!(
            config
                .apply_overrides(|key| (key == PORT_ENV).then(|| "http".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[cloudflare]\napi_token = \"t\"\nzone_id = \"z\"\n[registry]\npath = \"/srv/sites.json\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.registry.path, PathBuf::from("/srv/sites.json"));
    }
}
