use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::SessionId;
use crate::tui::theme::ThemeConfig;

pub const BACKEND_URL_ENV: &str = "TRIAGIST_BACKEND_URL";
pub const SESSION_ENV: &str = "TRIAGIST_SESSION";

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Session mounted when none is given on the command line.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Action name to key chord, e.g. `enable_agentic = "ctrl+e"`.
    #[serde(default)]
    pub keybindings: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Root of the assistant service. Default: `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How often the dashboard re-reads the status while exploration tools
    /// are still initializing. Default: 5
    #[serde(default = "default_status_poll_secs")]
    pub status_poll_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            status_poll_secs: default_status_poll_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_status_poll_secs() -> u64 {
    5
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_secs(self.status_poll_secs.max(1))
    }
}

impl Config {
    /// Backend URL by precedence: flag, then `TRIAGIST_BACKEND_URL`, then
    /// the config file (which already carries the default).
    pub fn backend_url(&self, flag: Option<&str>) -> String {
        resolve(flag, std::env::var(BACKEND_URL_ENV).ok(), Some(&self.backend.base_url))
            .unwrap_or_else(default_base_url)
    }

    /// Session by precedence: flag, then `TRIAGIST_SESSION`, then
    /// `session_id` from the config file.
    pub fn session(&self, flag: Option<&str>) -> Option<SessionId> {
        resolve(
            flag,
            std::env::var(SESSION_ENV).ok(),
            self.session_id.as_deref(),
        )
        .map(SessionId::new)
    }
}

/// First non-blank value of flag, environment, file.
fn resolve(flag: Option<&str>, env: Option<String>, file: Option<&str>) -> Option<String> {
    flag.map(str::to_string)
        .into_iter()
        .chain(env)
        .chain(file.map(str::to_string))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Returns the base triagist config directory: ~/.triagist/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".triagist"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

/// Returns the path to the dashboard log file
pub fn log_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("triagist.log"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    let base = base_dir()?;
    fs::create_dir_all(&base).context("failed to create ~/.triagist/")?;
    Ok(())
}

/// Load config from ~/.triagist/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

const DEFAULT_CONFIG: &str = r#"# Session mounted when --session / TRIAGIST_SESSION are not given.
# session_id = "abc123"

[backend]
base_url = "http://localhost:8000"
timeout_secs = 30
status_poll_secs = 5

[theme]
# Colour names or rgb(r,g,b), e.g.
# toast_error = "light_red"

[keybindings]
# Action name to key chord, e.g.
# enable_agentic = "ctrl+e"
"#;

/// Write a commented default config to `path` unless one already exists.
/// Returns whether a file was written.
pub fn write_default(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
