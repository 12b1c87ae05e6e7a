use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// A failure to load the target configuration. Always fatal to a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
    #[error("target {id}: {reason}")]
    InvalidTarget { id: String, reason: String },
}

/// One monitored endpoint. Immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub url: String,

    /// Per-target timeout in seconds; falls back to
    /// `Settings::default_timeout`.
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(default = "default_expected_status")]
    pub expected_status: u16,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_expected_status() -> u16 {
    200
}

fn default_enabled() -> bool {
    true
}

impl Target {
    /// Effective timeout in seconds for this target.
    pub fn timeout_or(&self, settings: &Settings) -> u64 {
        self.timeout.unwrap_or(settings.default_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub default_timeout: u64,
}

/// Target configuration document: the servers to watch plus global
/// settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub servers: Vec<Target>,
    pub settings: Settings,
}

impl Config {
    /// Load and validate the target configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for target in &self.servers {
            if !seen.insert(target.id.as_str()) {
                return Err(ConfigError::InvalidTarget {
                    id: target.id.clone(),
                    reason: "duplicate target id".into(),
                });
            }
            validate_endpoint(target)?;
        }
        Ok(())
    }
}

/// Targets must name a reachable HTTP or HTTPS URL.
fn validate_endpoint(target: &Target) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidTarget { id: target.id.clone(), reason };

    match Url::parse(&target.url) {
        Ok(url) => {
            let scheme = url.scheme();
            if scheme != "http" && scheme != "https" {
                return Err(invalid(format!("unsupported scheme '{scheme}'")));
            }
            if url.host_str().is_none() {
                return Err(invalid("URL has no host".into()));
            }
            Ok(())
        }
        Err(err) => Err(invalid(format!("invalid URL '{}': {err}", target.url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_fields_take_defaults() {
        let file = write_config(
            r#"{
                "servers": [
                    {"id": "api", "name": "API", "url": "https://api.example.com/health"}
                ],
                "settings": {"default_timeout": 10}
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        let target = &config.servers[0];
        assert_eq!(target.expected_status, 200);
        assert!(target.enabled);
        assert_eq!(target.timeout, None);
        assert_eq!(target.timeout_or(&config.settings), 10);
    }

    #[test]
    fn per_target_timeout_overrides_default() {
        let file = write_config(
            r#"{
                "servers": [
                    {"id": "slow", "name": "Slow", "url": "https://slow.example.com", "timeout": 30}
                ],
                "settings": {"default_timeout": 10}
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.servers[0].timeout_or(&config.settings), 30);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/servers.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_config("{not json");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let file = write_config(
            r#"{
                "servers": [
                    {"id": "ftp", "name": "FTP", "url": "ftp://example.com"}
                ],
                "settings": {"default_timeout": 10}
            }"#,
        );

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget { ref id, .. } if id == "ftp"));
    }

    #[test]
    fn duplicate_target_ids_are_rejected() {
        let file = write_config(
            r#"{
                "servers": [
                    {"id": "api", "name": "A", "url": "https://a.example.com"},
                    {"id": "api", "name": "B", "url": "https://b.example.com"}
                ],
                "settings": {"default_timeout": 10}
            }"#,
        );

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget { ref id, .. } if id == "api"));
    }
}
