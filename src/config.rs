use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::dispatch::credentials::{DEFAULT_LOGIN, DEFAULT_PASS};
use crate::http::mime::FileType;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:2024";
pub const DEFAULT_NAME: &str = "porthole";

/// Path of an optional YAML configuration file.
pub const CONFIG_ENV: &str = "PORTHOLE_CONFIG";
/// Overrides `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub credentials: CredentialsConfig,
    pub assets: AssetsConfig,
    /// Empty means the built-in site table.
    pub routes: Vec<RouteConfig>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub listen_addr: String,
    pub poll_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            poll_timeout_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub login: String,
    pub pass: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN.to_string(),
            pass: DEFAULT_PASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub post_only: bool,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the environment.
    ///
    /// `PORTHOLE_CONFIG` names a YAML file to start from; `LISTEN` replaces
    /// the listen address. An unnamed server takes `HOSTNAME`.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(listen_addr) = lookup(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        if cfg.server.name.is_empty() {
            cfg.server.name = lookup("HOSTNAME").unwrap_or_else(|| DEFAULT_NAME.to_string());
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("failed to parse YAML configuration")
    }

    /// Applies positional arguments `<name> <addr> <port>`; each one is optional.
    pub fn apply_args(&mut self, mut args: impl Iterator<Item = String>) {
        if let Some(name) = args.next() {
            self.server.name = name;
        }

        let addr = args.next();
        let port = args.next();
        if addr.is_none() && port.is_none() {
            return;
        }

        let (current_host, current_port) = match self.server.listen_addr.rsplit_once(':') {
            Some((host, port)) => (host.to_string(), port.to_string()),
            None => (self.server.listen_addr.clone(), "2024".to_string()),
        };
        self.server.listen_addr = format!(
            "{}:{}",
            addr.unwrap_or(current_host),
            port.unwrap_or(current_port)
        );
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.server.poll_timeout_ms.max(1))
    }

    /// Maximum tracing level; `warn` when unset or unrecognized.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::WARN)
    }
}
