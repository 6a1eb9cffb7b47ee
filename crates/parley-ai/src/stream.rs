//! Streaming response type

use crate::error::Result;
use std::pin::Pin;
use tokio_stream::Stream;

/// A lazily produced, single-consumption sequence of text fragments that
/// together form one reply.
///
/// The stream ends after the final fragment; a mid-stream failure surfaces
/// as one terminal `Err` item. Dropping the stream releases the underlying
/// connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;
