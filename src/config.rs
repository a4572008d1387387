//! Run-time configuration: where the backend lives, how long to wait for it,
//! how much undo history to keep and where to persist the bearer token.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_MAX_DEPTH;

pub const ENV_API_URL: &str = "PROCESS_STUDIO_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PROCESS_STUDIO_TIMEOUT_SECS";
pub const ENV_HISTORY_DEPTH: &str = "PROCESS_STUDIO_HISTORY_DEPTH";
pub const ENV_TOKEN_DIR: &str = "PROCESS_STUDIO_TOKEN_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_history_depth: usize,
    /// Directory for the persisted token; tokens are kept in memory when unset.
    pub token_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            max_history_depth: DEFAULT_MAX_DEPTH,
            token_dir: None,
        }
    }
}

impl StudioConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Defaults overridden by the `PROCESS_STUDIO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    pub fn with_overrides(
        self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = self;
        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_var(ENV_TIMEOUT_SECS, value)?;
        }
        if let Some(value) = lookup(ENV_HISTORY_DEPTH) {
            config.max_history_depth = parse_var(ENV_HISTORY_DEPTH, value)?;
        }
        if let Some(dir) = lookup(ENV_TOKEN_DIR) {
            config.token_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
