//! Directions client error types.

/// Errors from a directions provider.
///
/// Every variant is treated the same way by the ingestor: logged and turned
/// into an empty result.
#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered with a status other than `OK`
    #[error("provider status {status}")]
    Status {
        status: String,
        message: Option<String>,
    },

    /// Response body was not a directions payload
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider is switched off or misconfigured
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl DirectionsError {
    /// HTTP status code to attach to log records, if there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DirectionsError::Api { status, .. } => Some(*status),
            DirectionsError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the provider simply had nothing to offer.
    pub fn is_zero_results(&self) -> bool {
        matches!(self, DirectionsError::Status { status, .. } if status == "ZERO_RESULTS")
    }
}
