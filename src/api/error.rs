use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::envelope::{errors_text, Envelope};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unauthorized - access token rejected")]
    Unauthorized,

    #[error("session expired - please log in again")]
    SessionExpired,

    #[error("request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid response: {0}")]
    Invalid(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Pull a readable detail out of a failure body, preferring the
    /// envelope's errors/message fields over the raw text.
    fn detail(body: &str) -> String {
        if let Ok(envelope) = serde_json::from_str::<Envelope<Value>>(body) {
            if let Some(errors) = envelope.errors {
                return errors_text(&errors);
            }
            if let Some(message) = envelope.message {
                return message;
            }
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            400..=499 => ApiError::Client {
                status: status.as_u16(),
                message: Self::detail(body),
            },
            500..=599 => ApiError::Server {
                status: status.as_u16(),
                message: Self::detail(body),
            },
            _ => ApiError::Invalid(format!(
                "unexpected status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }
}
