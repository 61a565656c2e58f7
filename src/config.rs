use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::exercise::SYSTEM_OWNER_ID;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub exercises: ExercisesConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    /// Load the config file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_saphyr::from_str(&expanded)?)
    }

    /// Data directory, resolved against the config file location.
    ///
    /// `storage.path` wins; otherwise `<workspace>/data`.
    pub fn data_dir(&self, config_path: &Path) -> PathBuf {
        match &self.storage.path {
            Some(path) => resolve_path(config_path, path),
            None => {
                let workspace = self
                    .workspace
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));
                resolve_path(config_path, &workspace).join(DEFAULT_DATA_DIR)
            }
        }
    }
}

/// Resolve a path relative to the config file directory.
///
/// Absolute paths are returned as-is.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "ironlog.yaml";
/// Default workspace directory (relative to config file).
pub const DEFAULT_WORKSPACE: &str = ".ironlog";
/// Default data directory (relative to workspace).
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default analytics replica base URL.
pub const DEFAULT_ANALYTICS_URL: &str = "http://localhost:1010/api/analytics";
/// Abandoned-session sweep: daily at 02:00 UTC.
pub const DEFAULT_REAPER_CRON: &str = "0 0 2 * * * *";
/// Subscription renewal pass: daily at 09:00 UTC.
pub const DEFAULT_RENEWAL_CRON: &str = "0 0 9 * * * *";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    256
}

fn default_system_owner() -> Uuid {
    SYSTEM_OWNER_ID
}

fn default_analytics_url() -> String {
    DEFAULT_ANALYTICS_URL.to_string()
}

fn default_analytics_timeout() -> u64 {
    10
}

fn default_reaper_cron() -> String {
    DEFAULT_REAPER_CRON.to_string()
}

fn default_abandon_after_days() -> i64 {
    crate::workout::DEFAULT_ABANDON_AFTER_DAYS
}

fn default_renewal_cron() -> String {
    DEFAULT_RENEWAL_CRON.to_string()
}

fn default_renewal_period_days() -> i64 {
    crate::subscription::DEFAULT_RENEWAL_PERIOD_DAYS
}

fn default_reminder_interval_days() -> i64 {
    14
}

/// Serde default for bool fields that should be `true`.
fn default_true() -> bool {
    true
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` references before the YAML is parsed.
///
/// - `${VAR}`: required, errors if unset
/// - `${VAR:-default}`: falls back to `default` (may be empty)
/// - `$$`: literal `$`
///
/// A `$` not followed by `{` or `$` is kept as-is. Nested references are
/// not supported.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or(ConfigError::UnclosedVarReference)?;
            out.push_str(&lookup_var(&body[..end])?);
            rest = &body[end + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Resolve the inside of `${...}`.
fn lookup_var(reference: &str) -> Result<String, ConfigError> {
    let (name, default) = match reference.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (reference, None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Bearer token for `/api/v1`. Unset means loopback callers only.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Bearer token for `/api/admin/v1`. Unset means loopback callers only.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            max_connections: default_max_connections(),
            api_token: None,
            admin_token: None,
        }
    }
}

// ============================================================================
// StorageConfig
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// ExercisesConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ExercisesConfig {
    /// Owner id whose exercises every user may reference.
    #[serde(default = "default_system_owner")]
    pub system_owner: Uuid,
}

impl Default for ExercisesConfig {
    fn default() -> Self {
        Self {
            system_owner: default_system_owner(),
        }
    }
}

// ============================================================================
// AnalyticsConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// When false, pushes go to a no-op client.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_analytics_url")]
    pub base_url: String,
    #[serde(default = "default_analytics_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_analytics_url(),
            timeout_seconds: default_analytics_timeout(),
        }
    }
}

// ============================================================================
// SchedulerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reaper_cron")]
    pub reaper_cron: String,
    #[serde(default = "default_abandon_after_days")]
    pub abandon_after_days: i64,
    #[serde(default = "default_renewal_cron")]
    pub renewal_cron: String,
    #[serde(default = "default_renewal_period_days")]
    pub renewal_period_days: i64,
    #[serde(default = "default_reminder_interval_days")]
    pub upgrade_reminder_interval_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reaper_cron: default_reaper_cron(),
            abandon_after_days: default_abandon_after_days(),
            renewal_cron: default_renewal_cron(),
            renewal_period_days: default_renewal_period_days(),
            upgrade_reminder_interval_days: default_reminder_interval_days(),
        }
    }
}
