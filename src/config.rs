use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_ms: u64,
    #[serde(default = "default_probe_interval")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("vocab-review.redb")
}

fn default_submit_timeout() -> u64 {
    10000
}

fn default_probe_interval() -> u64 {
    15000
}

fn default_probe_path() -> String {
    "/health".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            data_path: default_data_path(),
            submit_timeout_ms: default_submit_timeout(),
            probe_interval_ms: default_probe_interval(),
            probe_path: default_probe_path(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReviewError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ReviewError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ReviewError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_url(&self) -> String {
        format!(
            "{}{}",
            self.server_url.trim_end_matches('/'),
            self.probe_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.data_path, PathBuf::from("vocab-review.redb"));
        assert_eq!(config.submit_timeout(), Duration::from_secs(10));
        assert_eq!(config.probe_url(), "http://localhost:3000/health");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "server_url": "https://lingo.example.com/",
            "data_path": "/var/lib/vocab/store.redb",
            "submit_timeout_ms": 2500,
            "probe_interval_ms": 5000,
            "probe_path": "/api/ping"
        }"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.submit_timeout(), Duration::from_millis(2500));
        assert_eq!(config.probe_interval(), Duration::from_secs(5));
        assert_eq!(config.probe_url(), "https://lingo.example.com/api/ping");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server_url": "http://10.0.0.2:8080"}}"#).unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert_eq!(config.probe_interval_ms, 15000);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = ClientConfig::load(Path::new("/nonexistent/vocab.json"));
        assert!(matches!(result, Err(ReviewError::Config(_))));
    }
}
