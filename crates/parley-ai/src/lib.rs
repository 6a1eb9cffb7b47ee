//! parley-ai: streaming client for the Anthropic Messages API
//!
//! This crate provides the conversation types, the error taxonomy, and a
//! provider that turns one chat request into a stream of text fragments.

pub mod error;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use providers::CompletionProvider;
pub use stream::TextStream;
pub use types::*;
