//! Configuration for the StudioFlow client.
//!
//! Settings live in `~/.studioflow/config.toml`. The file is optional; every
//! field has a default, and string values may reference environment variables
//! with `${NAME}`.
//!
//! ```toml
//! [api]
//! base_url = "${STUDIOFLOW_HOST}"
//! request_timeout_secs = 30
//! connect_timeout_secs = 10
//! logout_path = "/auth/logout"
//!
//! [session]
//! file = "~/.studioflow/session.json"
//! persist = true
//! ```

use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Overrides `api.base_url` when set and non-empty.
pub const BASE_URL_ENV_VAR: &str = "STUDIOFLOW_API_URL";

const CONFIG_DIR_NAME: &str = ".studioflow";
const SESSION_FILE_NAME: &str = "session.json";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct StudioFlowConfig {
    pub api: Option<ApiSection>,
    pub session: Option<SessionSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// Session-invalidation endpoint called by logout before the local teardown.
    pub logout_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionSection {
    /// Location of the durable session file. `~/` is expanded.
    pub file: Option<String>,
    /// When false the session token lives in memory only.
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            file: None,
            persist: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Replace every `${NAME}` in `value` with the environment variable's value.
///
/// Missing variables become empty strings; an unclosed `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    expand_env_vars_with(value, |name| env::var(name).ok())
}

pub fn expand_env_vars_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&lookup(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Expand a leading `~/` to the home directory.
fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(value)
}

impl StudioFlowConfig {
    /// Load the config file from its default location.
    ///
    /// Returns `Ok(None)` when there is no home directory or no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Backend origin, honoring [`BASE_URL_ENV_VAR`].
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url_with_override(env::var(BASE_URL_ENV_VAR).ok())
    }

    #[must_use]
    pub fn base_url_with_override(&self, env_override: Option<String>) -> String {
        if let Some(url) = env_override.filter(|v| !v.trim().is_empty()) {
            return url.trim().to_string();
        }
        self.api
            .as_ref()
            .and_then(|api| api.base_url.as_deref())
            .map(expand_env_vars)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |v| v.trim().to_string())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|api| api.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|api| api.connect_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn logout_path(&self) -> Option<String> {
        self.api
            .as_ref()
            .and_then(|api| api.logout_path.as_deref())
            .map(expand_env_vars)
            .filter(|v| !v.trim().is_empty())
    }

    /// Where the session token is persisted; `None` means memory only.
    #[must_use]
    pub fn session_file(&self) -> Option<PathBuf> {
        let section = self.session.as_ref();
        if section.is_some_and(|s| !s.persist) {
            return None;
        }
        match section.and_then(|s| s.file.as_deref()) {
            Some(file) if !file.trim().is_empty() => Some(expand_home(&expand_env_vars(file))),
            _ => default_session_path(),
        }
    }
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn default_session_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SESSION_FILE_NAME))
}
