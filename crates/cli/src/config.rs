//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML/JSON file, then `TASKDASH_*` environment variables (`__` separates
//! nested keys, e.g. `TASKDASH_API__BASE_URL`). Command-line flags are
//! applied on top by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "TASKDASH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    /// Where cookies and logs are kept
    pub state_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout; 0 disables it
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_from(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }

    /// Configured state dir, or `$TASKDASH_STATE_DIR`, or the platform data dir
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.state_dir().join("cookies.json")
    }

    pub const fn timeout(&self) -> Option<Duration> {
        match self.api.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_state_dir() -> PathBuf {
    // Check environment variable first, then fall back to system data dir
    if let Ok(state_dir) = std::env::var("TASKDASH_STATE_DIR") {
        PathBuf::from(state_dir)
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskdash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn defaults_without_sources() {
        let config = DashboardConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskdash.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n[api]\nbase_url = \"https://tasks.example.com\"\n",
        )
        .unwrap();

        let config = DashboardConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(config.api.base_url, "https://tasks.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskdash.json");
        std::fs::write(&path, r#"{"api": {"base_url": "https://file.example.com"}}"#).unwrap();

        let config = DashboardConfig::load_from(
            Some(&path),
            env(&[
                ("TASKDASH_API__BASE_URL", "https://env.example.com"),
                ("TASKDASH_API__TIMEOUT_SECS", "0"),
                ("TASKDASH_STATE_DIR", "/tmp/taskdash-state"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://env.example.com");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.cookie_path(), PathBuf::from("/tmp/taskdash-state/cookies.json"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DashboardConfig::load_from(Some(&dir.path().join("nope.toml")), env(&[]));
        assert!(result.is_err());
    }
}
