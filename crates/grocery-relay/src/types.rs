//! Wire types.
//!
//! Inbound: the page posts `{api_key, image_data: {mediaType, base64}}`.
//! The body is parsed loosely as a `serde_json::Value` because the relay only
//! checks that the two top-level fields are present and truthy; nested values
//! are forwarded upstream exactly as received.
//!
//! Outbound: a subset of Anthropic's `/v1/messages` request body.

use crate::error::RelayError;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Map, Value};

/// A parsed `POST /api/claude` body.
#[derive(Debug)]
pub struct InboundRequest {
    pub api_key: SecretString,
    pub image_data: ImageData,
}

/// The `image_data` object as sent by the page.
#[derive(Debug, Clone)]
pub struct ImageData(Map<String, Value>);

impl InboundRequest {
    /// Parse and validate a raw request body.
    ///
    /// Missing or falsy `api_key` / `image_data` yields
    /// [`RelayError::MissingFields`]; any other problem is a processing error.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body).map_err(RelayError::InvalidJson)?;
        let mut fields = match value {
            Value::Object(map) => map,
            _ => return Err(RelayError::NotAnObject),
        };

        let api_key = fields.remove("api_key").filter(is_truthy);
        let image_data = fields.remove("image_data").filter(is_truthy);

        let (api_key, image_data) = match (api_key, image_data) {
            (Some(k), Some(i)) => (k, i),
            _ => return Err(RelayError::MissingFields),
        };

        let api_key = match api_key {
            Value::String(s) => SecretString::from(s),
            _ => return Err(RelayError::ApiKeyNotString),
        };

        let image_data = match image_data {
            Value::Object(map) => ImageData(map),
            _ => return Err(RelayError::ImageDataNotObject),
        };

        Ok(Self {
            api_key,
            image_data,
        })
    }
}

impl ImageData {
    /// Declared MIME type (`mediaType`).
    pub fn media_type(&self) -> Result<&Value, RelayError> {
        self.field("mediaType")
    }

    /// Base64-encoded image bytes (`base64`).
    pub fn base64(&self) -> Result<&Value, RelayError> {
        self.field("base64")
    }

    fn field(&self, name: &'static str) -> Result<&Value, RelayError> {
        self.0.get(name).ok_or(RelayError::MissingImageField(name))
    }
}

/// Python-style JSON truthiness, which the organizer page relies on: `null`,
/// `false`, zero, and empty strings, arrays or objects are all "missing".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A message role in the Anthropic Messages API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
}

/// A message in the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

/// A content block within `messages[].content`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

/// Image content source.
///
/// `media_type` and `data` stay as raw JSON so malformed page input reaches
/// the upstream untouched.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: ImageSourceType,
    pub media_type: Value,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSourceType {
    Base64,
}

/// Request body for `/v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesPayload {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}
