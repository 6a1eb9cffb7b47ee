//! Anthropic Messages API provider

use crate::{
    error::{Error, Result},
    providers::CompletionProvider,
    stream::TextStream,
    types::{ConversationHistory, Message},
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicProvider {
    /// Create a new provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create from the ANTHROPIC_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = super::get_api_key(None, "ANTHROPIC_API_KEY")?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn stream_chat(
        &self,
        model: &str,
        max_tokens: u32,
        history: &ConversationHistory,
    ) -> Result<TextStream> {
        let request = MessagesRequest {
            model: model.to_string(),
            messages: convert_messages(history.messages()),
            max_tokens,
            stream: true,
        };
        let url = format!("{}/v1/messages", BASE_URL);

        tracing::debug!("Anthropic API URL: {}", url);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            self.api_key.parse().map_err(|_| Error::InvalidApiKey)?,
        );
        headers.insert("anthropic-version", ANTHROPIC_VERSION.parse().unwrap());
        headers.insert("accept", "application/json".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let request_builder = self.client.post(&url).headers(headers).json(&request);

        let mut event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        // Poll once so HTTP-level failures surface from the call itself
        // rather than as stream items.
        match event_source.next().await {
            Some(Ok(Event::Open)) => {}
            Some(Ok(Event::Message(message))) => {
                return Err(Error::UnexpectedResponse(format!(
                    "SSE event before stream open: {}",
                    message.event
                )));
            }
            Some(Err(e)) => return Err(classify_transport_error(e).await),
            None => {
                return Err(Error::UnexpectedResponse(
                    "stream closed before open".to_string(),
                ));
            }
        }

        Ok(Box::pin(text_fragments(event_source)))
    }
}

/// Adapt the SSE event sequence into a stream of text fragments
fn text_fragments(mut event_source: EventSource) -> impl futures::Stream<Item = Result<String>> {
    stream! {
        while let Some(event_result) = event_source.next().await {
            match event_result {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => match message.event.as_str() {
                    "content_block_delta" => {
                        match serde_json::from_str::<ContentBlockDeltaEvent>(&message.data) {
                            Ok(data) => {
                                if data.delta.delta_type == "text_delta" {
                                    if let Some(text) = data.delta.text {
                                        yield Ok(text);
                                    }
                                }
                            }
                            Err(e) => {
                                yield Err(Error::Json(e));
                                break;
                            }
                        }
                    }
                    "message_stop" => break,
                    "error" => {
                        let error = match serde_json::from_str::<ErrorEnvelope>(&message.data) {
                            Ok(data) => {
                                classify_api_error(&data.error.error_type, data.error.message)
                            }
                            Err(e) => Error::Json(e),
                        };
                        yield Err(error);
                        break;
                    }
                    // message_start, content_block_start/stop, message_delta, ping
                    _ => {}
                },
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    yield Err(Error::Sse(e.to_string()));
                    break;
                }
            }
        }
        event_source.close();
    }
}

/// Map a transport-level SSE failure to the error taxonomy
async fn classify_transport_error(error: reqwest_eventsource::Error) -> Error {
    match error {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let body = response.text().await.unwrap_or_default();
            let (error_type, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.error_type, envelope.error.message),
                Err(_) => (status.to_string(), body),
            };

            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
                StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { retry_after },
                _ => classify_api_error(&error_type, message),
            }
        }
        reqwest_eventsource::Error::Transport(e) => Error::Http(e),
        e => Error::Sse(e.to_string()),
    }
}

/// Map an API error envelope to the error taxonomy by its type tag
fn classify_api_error(error_type: &str, message: String) -> Error {
    match error_type {
        "authentication_error" | "permission_error" => Error::Auth(message),
        "rate_limit_error" | "overloaded_error" => Error::RateLimited { retry_after: None },
        _ => Error::api(error_type, message),
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

// ============================================================================
// Response event types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContentBlockDeltaEvent {
    delta: DeltaInfo,
}

#[derive(Debug, Deserialize)]
struct DeltaInfo {
    #[serde(rename = "type")]
    delta_type: String,
    text: Option<String>,
}

/// Error payload shape shared by SSE `error` events and non-2xx bodies
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|message| WireMessage {
            role: message.role.as_str(),
            content: message.content.clone(),
        })
        .collect()
}
