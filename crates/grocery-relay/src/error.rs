//! Relay error type and its HTTP rendering.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Message returned when either required field is absent.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing api_key or image_data";

#[derive(Debug, Error)]
pub enum RelayError {
    /// `api_key` or `image_data` is missing or falsy.
    #[error("Missing api_key or image_data")]
    MissingFields,

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("api_key must be a string")]
    ApiKeyNotString,

    #[error("image_data must be an object")]
    ImageDataNotObject,

    #[error("image_data is missing `{0}`")]
    MissingImageField(&'static str),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("upstream returned invalid status code {0}")]
    InvalidStatus(u16),
}

impl RelayError {
    /// Whether this is a local validation failure rather than a processing one.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingFields)
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
