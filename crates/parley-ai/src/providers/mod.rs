//! Provider implementations

pub mod anthropic;

use crate::{
    ConversationHistory, TextStream,
    error::{Error, Result},
};
use async_trait::async_trait;

pub use anthropic::AnthropicProvider;

/// Capability of producing one streamed chat completion from a transcript.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Start a streamed completion for the full conversation history.
    ///
    /// Call-time failures (HTTP status, auth, rate limit) are returned as
    /// `Err`; mid-stream failures arrive as a terminal `Err` item on the
    /// returned stream.
    async fn stream_chat(
        &self,
        model: &str,
        max_tokens: u32,
        history: &ConversationHistory,
    ) -> Result<TextStream>;
}

/// Get an API key from environment or provided value
pub fn get_api_key(provided: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = provided {
        return Ok(key.to_string());
    }

    std::env::var(env_var).map_err(|_| Error::InvalidApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_api_key_prefers_provided_value() {
        let key = get_api_key(Some("sk-test"), "PARLEY_AI_UNSET_TEST_VAR").unwrap();
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn test_get_api_key_reads_env_var() {
        unsafe { std::env::set_var("PARLEY_AI_KEY_TEST_VAR", "sk-from-env") };
        let key = get_api_key(None, "PARLEY_AI_KEY_TEST_VAR").unwrap();
        assert_eq!(key, "sk-from-env");
    }

    #[test]
    fn test_get_api_key_missing_env_var() {
        let error = get_api_key(None, "PARLEY_AI_NO_SUCH_VAR").unwrap_err();
        assert!(matches!(error, Error::InvalidApiKey));
        assert!(error.is_auth());
        assert!(!error.is_rate_limit());
    }
}
