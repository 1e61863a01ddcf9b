//! AI client error types.

use reqwest::StatusCode;
use thiserror::Error;

pub type AiResult<T> = Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    /// Non-2xx answer. `message` is the body's `error` or `message` field.
    #[error("AI service returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AiError {
    /// Transport failures and server-side errors may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Network(_) => true,
            AiError::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Text shown to the user when no server-provided message exists.
    pub fn transport_text(&self) -> String {
        match self {
            AiError::Http { status, .. } => {
                format!("Request failed with status code {}", status.as_u16())
            }
            other => other.to_string(),
        }
    }
}
