// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_PATH: &str = "/tmp/careerhub.log";

/// Client configuration, built once at process start and passed down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: Option<ClientConfig>,
    production: Option<ClientConfig>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

fn default_session_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".careerhub").join("session.toml")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            timeout_seconds: default_timeout(),
            session_path: default_session_path(),
            log_path: default_log_path(),
        }
    }
}

impl ClientConfig {
    /// `config.yaml` (if present) for the current environment, then env overrides
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        let config_path = PathBuf::from("config.yaml");

        let config = if config_path.exists() {
            Self::load_from_file(&config_path, &environment)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    fn get_environment() -> String {
        std::env::var("CAREERHUB_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        let config = section.with_context(|| {
            format!("{} has no '{}' section", path.display(), environment)
        })?;

        info!(
            "Loaded configuration for environment {} from {}",
            environment,
            path.display()
        );
        Ok(config)
    }

    /// Apply CAREERHUB_* overrides through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CAREERHUB_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(timeout) = lookup("CAREERHUB_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_seconds = timeout;
        }
        if let Some(path) = lookup("CAREERHUB_SESSION_PATH") {
            self.session_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CAREERHUB_LOG_PATH") {
            self.log_path = PathBuf::from(path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_picks_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "local:\n  api_base_url: http://localhost:9000\nproduction:\n  api_base_url: https://api.example.org/v1\n  timeout_seconds: 10"
        )
        .unwrap();

        let local = ClientConfig::load_from_file(file.path(), "local").unwrap();
        assert_eq!(local.api_base_url, "http://localhost:9000");
        assert_eq!(local.timeout_seconds, DEFAULT_TIMEOUT_SECS);

        let prod = ClientConfig::load_from_file(file.path(), "production").unwrap();
        assert_eq!(prod.api_base_url, "https://api.example.org/v1");
        assert_eq!(prod.timeout_seconds, 10);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "local:\n  timeout_seconds: 5").unwrap();
        assert!(ClientConfig::load_from_file(file.path(), "production").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::default().with_env_overrides(|key| match key {
            "CAREERHUB_API_URL" => Some("https://staging.example.org".to_string()),
            "CAREERHUB_TIMEOUT_SECS" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://staging.example.org");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
    }
}
