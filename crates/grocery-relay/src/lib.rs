//! Grocery Relay - HTTP relay for the grocery list organizer page.
//!
//! Browsers cannot call Anthropic's `/v1/messages` API directly because of
//! cross-origin restrictions. This crate exposes a single `POST /api/claude`
//! endpoint that accepts `{api_key, image_data}` from the page, reshapes it
//! into a Messages request asking the model to read a handwritten grocery
//! list, and hands the upstream response back untouched.
//!
//! Behaviour:
//! - Missing `api_key` / `image_data` is rejected locally with a 400.
//! - Any upstream status and JSON body is passed through as-is.
//! - Everything else that goes wrong becomes `{"error": ...}` with a 500.

pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod relay;
pub mod server;
pub mod types;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use server::serve;
pub use upstream::{AnthropicTransport, MessagesTransport, UpstreamReply};
