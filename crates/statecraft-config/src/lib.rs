//! Workspace configuration for statecraft hosts.
//!
//! TOML workspaces, credential resolution (override + env + keyring +
//! plaintext), and translation to `statecraft_core::ProviderConfig`. The
//! result is built once at startup and passed explicitly to
//! `statecraft_core::connect`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use statecraft_core::{DEFAULT_CREDENTIAL_HEADER, ProviderConfig, TlsMode};

const KEYRING_SERVICE: &str = "statecraft";
const ENV_PREFIX: &str = "STATECRAFT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for workspace '{workspace}'")]
    NoCredentials { workspace: String },

    #[error("unknown workspace '{name}'")]
    UnknownWorkspace { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Workspace used when none is named explicitly.
    pub default_workspace: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named API endpoints and their credentials.
    #[serde(default)]
    pub workspaces: BTreeMap<String, Workspace>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_workspace: Some("default".into()),
            defaults: Defaults::default(),
            workspaces: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    /// Header the credential is sent in.
    #[serde(default = "default_credential_header")]
    pub credential_header: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
            credential_header: default_credential_header(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_credential_header() -> String {
    DEFAULT_CREDENTIAL_HEADER.into()
}

/// A named API endpoint.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Workspace {
    /// API base URL (e.g. "https://engine.example.com/api/").
    pub hostname: String,

    /// Credential string (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the credential string.
    pub token_env: Option<String>,

    /// Override the credential header name.
    pub credential_header: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

/// Values supplied by the host at run time, taking precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub workspace: Option<String>,
    pub hostname: Option<String>,
    pub token: Option<SecretString>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "statecraft", "statecraft").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("statecraft");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` layered over defaults, with `STATECRAFT_*` environment
/// variables on top. Nested keys use `__` (`STATECRAFT_DEFAULTS__TIMEOUT`).
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the credential string for a workspace.
///
/// Order: explicit override, `token_env` variable, system keyring entry
/// `<workspace>/token`, plaintext `token`.
pub fn resolve_token(
    workspace: &Workspace,
    workspace_name: &str,
    override_token: Option<&SecretString>,
) -> Result<SecretString, ConfigError> {
    // 1. Explicit override
    if let Some(token) = override_token {
        return Ok(token.clone());
    }

    // 2. Workspace's token_env → env var lookup
    if let Some(ref env_name) = workspace.token_env {
        if let Ok(val) = std::env::var(env_name) {
            debug!(workspace = workspace_name, env = %env_name, "token from environment");
            return Ok(SecretString::from(val));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{workspace_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            debug!(workspace = workspace_name, "token from keyring");
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref token) = workspace.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        workspace: workspace_name.into(),
    })
}

/// Store a credential in the system keyring for `workspace_name`.
pub fn store_token(workspace_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{workspace_name}/token"))
        .and_then(|entry| entry.set_password(token))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Provider config ─────────────────────────────────────────────────

/// Build the `ProviderConfig` for the selected workspace.
///
/// The workspace is `overrides.workspace`, else `default_workspace`, else
/// "default". An unknown workspace is an error unless `overrides.hostname`
/// supplies the endpoint directly.
pub fn resolve_provider_config(
    config: &Config,
    overrides: &Overrides,
) -> Result<ProviderConfig, ConfigError> {
    let name = overrides
        .workspace
        .as_deref()
        .or(config.default_workspace.as_deref())
        .unwrap_or("default");

    let fallback = Workspace::default();
    let workspace = match (config.workspaces.get(name), &overrides.hostname) {
        (Some(ws), _) => ws,
        (None, Some(_)) => &fallback,
        (None, None) => {
            return Err(ConfigError::UnknownWorkspace { name: name.into() });
        }
    };

    let raw_hostname = overrides
        .hostname
        .as_deref()
        .unwrap_or(&workspace.hostname);
    let hostname = parse_hostname(raw_hostname)?;

    let token = resolve_token(workspace, name, overrides.token.as_ref())?;

    let tls = if workspace.insecure.unwrap_or(config.defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = workspace.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(workspace.timeout.unwrap_or(config.defaults.timeout));
    let credential_header = workspace
        .credential_header
        .clone()
        .unwrap_or_else(|| config.defaults.credential_header.clone());

    Ok(ProviderConfig {
        hostname,
        token,
        credential_header,
        timeout,
        tls,
    })
}

fn parse_hostname(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "hostname".into(),
        reason,
    };
    if raw.is_empty() {
        return Err(invalid("not set".into()));
    }
    let url: Url = raw
        .parse()
        .map_err(|e| invalid(format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
