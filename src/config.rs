//! Backend endpoint configuration
//!
//! Defaults point at a backend on localhost. A `config.toml` in the user's
//! config directory overrides them, and `CONVO_BACKEND_URL` overrides the base
//! URL on top of that.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const BACKEND_URL_ENV: &str = "CONVO_BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub generate_path: String,
    pub classify_path: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            generate_path: "/generate-prompt".to_string(),
            classify_path: "/classify-nodes".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Fully resolved endpoint URLs
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub generate: Url,
    pub classify: Url,
}

impl AppConfig {
    /// Default location: `<config_dir>/convo-canvas/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("convo-canvas").join("config.toml"))
    }

    /// Parse a config file; missing keys keep their defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load from the default location, falling back to defaults on any problem
    pub fn load() -> Self {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring config file: {:#}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_backend_override(url);
        }

        config
    }

    pub fn apply_backend_override(&mut self, url: String) {
        let url = url.trim();
        if !url.is_empty() {
            self.backend_url = url.to_string();
        }
    }

    /// Join the base URL with each endpoint path
    pub fn endpoints(&self) -> anyhow::Result<Endpoints> {
        let base = Url::parse(&self.backend_url)
            .with_context(|| format!("invalid backend URL '{}'", self.backend_url))?;
        Ok(Endpoints {
            generate: join_path(&base, &self.generate_path)?,
            classify: join_path(&base, &self.classify_path)?,
        })
    }
}

fn join_path(base: &Url, path: &str) -> anyhow::Result<Url> {
    // Keep any path prefix on the base ("http://host/api" + "/x" -> "/api/x")
    let mut joined = base.clone();
    let prefix = base.path().trim_end_matches('/');
    joined.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
    if joined.cannot_be_a_base() {
        anyhow::bail!("backend URL '{}' cannot carry a path", base);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let endpoints = AppConfig::default().endpoints().unwrap();
        assert_eq!(endpoints.generate.as_str(), "http://127.0.0.1:5000/generate-prompt");
        assert_eq!(endpoints.classify.as_str(), "http://127.0.0.1:5000/classify-nodes");
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let mut config = AppConfig::default();
        config.apply_backend_override("https://example.com/api/".to_string());
        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.generate.as_str(), "https://example.com/api/generate-prompt");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_backend_override("   ".to_string());
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_invalid_backend_url() {
        let mut config = AppConfig::default();
        config.backend_url = "not a url".to_string();
        assert!(config.endpoints().is_err());
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend_url = \"http://10.0.0.2:8080\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:8080");
        assert_eq!(config.generate_path, "/generate-prompt");
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend_url = [").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
