//! Configuration from defaults, an optional YAML file, and environment
//! variables (in increasing precedence; CLI flags are layered on top in
//! `cli`).
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8001
//! request_timeout_secs: 60
//! static_page: ./grocery-list-organizer.html
//! ```
//!
//! **Environment variables:**
//! - `HOST`: listen address (default: 0.0.0.0)
//! - `PORT`: listen port (default: 8001)
//! - `UPSTREAM_URL`: Messages endpoint (default: https://api.anthropic.com/v1/messages)
//! - `REQUEST_TIMEOUT_SECS`: upstream request timeout (default: none)
//! - `STATIC_PAGE`: HTML page served at `/`
//! - `MAX_BODY_BYTES`: largest accepted request body (default: 20 MiB)

use crate::upstream::DEFAULT_UPSTREAM_URL;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_CANDIDATES: &[&str] = &["grocery-relay.yml", "grocery-relay.yaml"];

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_STATIC_PAGE: &str = "grocery-list-organizer.html";
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    /// Unset means the upstream call may take as long as it takes.
    pub request_timeout_secs: Option<u64>,
    pub static_page: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            request_timeout_secs: None,
            static_page: PathBuf::from(DEFAULT_STATIC_PAGE),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RelayConfig {
    /// Load from `path` (or a config file in the working directory, if any),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        Ok(base.with_env_overrides(|key| env::var(key).ok()))
    }

    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Failed to parse YAML")
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Values that fail to parse are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(url) = lookup("UPSTREAM_URL") {
            self.upstream_url = url;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS").and_then(|p| p.parse().ok()) {
            self.request_timeout_secs = Some(secs);
        }
        if let Some(page) = lookup("STATIC_PAGE") {
            self.static_page = PathBuf::from(page);
        }
        if let Some(limit) = lookup("MAX_BODY_BYTES").and_then(|p| p.parse().ok()) {
            self.max_body_bytes = limit;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}
