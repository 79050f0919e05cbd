//! Command line flags

use crate::config::RelayConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Grocery Relay - forwards grocery list photos to the Anthropic Messages API
#[derive(Parser, Debug)]
#[command(name = "grocery-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (defaults to ./grocery-relay.yml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// HTML page served at `/`
    #[arg(long)]
    pub static_page: Option<PathBuf>,

    /// Abort upstream calls after this many seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

impl Cli {
    /// Resolve the effective configuration: file and environment first, then
    /// any flags given on the command line.
    pub fn resolve_config(&self) -> Result<RelayConfig> {
        let config = RelayConfig::load(self.config.as_deref())?;
        Ok(self.apply(config))
    }

    pub fn apply(&self, mut config: RelayConfig) -> RelayConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(page) = &self.static_page {
            config.static_page = page.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        config
    }
}
