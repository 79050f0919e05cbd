//! Outbound call to the Anthropic Messages endpoint.
//!
//! [`MessagesTransport`] is the seam between the relay and the network so the
//! relay can be exercised against an in-memory transport in tests.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::types::MessagesPayload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A completed upstream exchange, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait MessagesTransport: Send + Sync {
    /// Send `payload` authenticated with `api_key`.
    ///
    /// Non-2xx statuses are not errors; only failures to complete the
    /// exchange or to decode the body as JSON are.
    async fn send(&self, api_key: &str, payload: &MessagesPayload)
        -> Result<UpstreamReply, RelayError>;
}

/// reqwest-backed transport. The client's connection pool is shared by all
/// requests served by the process.
#[derive(Debug, Clone)]
pub struct AnthropicTransport {
    client: reqwest::Client,
    url: String,
}

impl AnthropicTransport {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build reqwest client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(config.upstream_url.clone(), config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessagesTransport for AnthropicTransport {
    async fn send(
        &self,
        api_key: &str,
        payload: &MessagesPayload,
    ) -> Result<UpstreamReply, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(status, len = bytes.len(), "upstream responded");

        let body = serde_json::from_slice(&bytes).map_err(RelayError::MalformedResponse)?;
        Ok(UpstreamReply { status, body })
    }
}
