//! Error types for parley-ai

use thiserror::Error;

/// Result type alias using parley-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the model API
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a rate-limit condition (recoverable per-turn)
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Api {
                error_type,
                message,
            } => {
                let et = error_type.to_lowercase();
                let msg = message.to_lowercase();
                // Rate limit / overload patterns in API errors
                et.contains("rate_limit")
                    || et.contains("overloaded")
                    || msg.contains("rate limit")
                    || msg.contains("too many requests")
                    || msg.contains("429")
            }
            _ => false,
        }
    }

    /// Check if this error is an authentication failure (fatal)
    pub fn is_auth(&self) -> bool {
        match self {
            Error::Auth(_) | Error::InvalidApiKey => true,
            Error::Api { error_type, .. } => {
                let et = error_type.to_lowercase();
                et.contains("authentication") || et.contains("permission")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- is_rate_limit ---

    #[test]
    fn test_rate_limit_typed_variant() {
        assert!(Error::RateLimited { retry_after: Some(5) }.is_rate_limit());
        assert!(Error::RateLimited { retry_after: None }.is_rate_limit());
    }

    #[test]
    fn test_rate_limit_api_error_type() {
        let e = Error::api("rate_limit_error", "You have exceeded the rate limit");
        assert!(e.is_rate_limit());
    }

    #[test]
    fn test_rate_limit_api_overloaded_error_type() {
        let e = Error::api("overloaded_error", "The server is overloaded");
        assert!(e.is_rate_limit());
    }

    #[test]
    fn test_rate_limit_api_message() {
        let e = Error::api("error", "Rate limit exceeded, please retry");
        assert!(e.is_rate_limit());
    }

    #[test]
    fn test_rate_limit_api_too_many_requests() {
        let e = Error::api("error", "Too many requests");
        assert!(e.is_rate_limit());
    }

    #[test]
    fn test_not_rate_limit_api_auth() {
        let e = Error::api("authentication_error", "Invalid API key");
        assert!(!e.is_rate_limit());
    }

    #[test]
    fn test_not_rate_limit_other_variants() {
        assert!(!Error::InvalidApiKey.is_rate_limit());
        assert!(!Error::Auth("bad key".into()).is_rate_limit());
        assert!(!Error::Sse("connection reset".into()).is_rate_limit());
    }

    // --- is_auth ---

    #[test]
    fn test_auth_typed_variants() {
        assert!(Error::Auth("bad key".into()).is_auth());
        assert!(Error::InvalidApiKey.is_auth());
    }

    #[test]
    fn test_auth_api_error_type() {
        let e = Error::api("authentication_error", "Invalid API key");
        assert!(e.is_auth());
    }

    #[test]
    fn test_auth_api_permission_error_type() {
        let e = Error::api("permission_error", "Key lacks access to this model");
        assert!(e.is_auth());
    }

    #[test]
    fn test_not_auth_generic() {
        assert!(!Error::api("invalid_request_error", "Bad request").is_auth());
        assert!(!Error::RateLimited { retry_after: None }.is_auth());
        assert!(!Error::UnexpectedResponse("garbage".into()).is_auth());
    }
}
