//! Error types for the Airtable client.

use serde::Deserialize;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, AirtableError>;

/// Errors produced at the Airtable HTTP boundary.
///
/// Every failed remote call is classified into exactly one of these variants
/// when the response (or transport failure) is observed; the retry layer only
/// ever inspects the variant, never the underlying response.
#[derive(Debug, thiserror::Error)]
pub enum AirtableError {
    /// Transport-level failure with no HTTP status (DNS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status other than 429.
    #[error("Airtable API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered 429, optionally with a `Retry-After` hint in seconds.
    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl AirtableError {
    /// Check if this error is worth retrying.
    ///
    /// Rate limits are always retryable; API errors only for server-side or
    /// timeout-ish statuses. Errors that carry no status code are not
    /// retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            Self::Http(_) | Self::Config(_) | Self::InvalidUrl(_) => false,
        }
    }

    /// Server-supplied minimum wait in seconds, if the error carried one.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        // Airtable wraps failures as {"error": {"type": ..., "message": ...}}
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| body.to_string());

        Self::Api { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
