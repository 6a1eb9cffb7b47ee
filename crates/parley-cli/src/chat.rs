//! Chat session loop: one conversation from start to termination

use anyhow::Result;
use futures::StreamExt;
use parley_ai::{CompletionProvider, ConversationHistory};
use std::io::{BufRead, Write};

/// How a turn ended, for the caller to decide continue vs terminate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Reply streamed fully and was committed to history
    Completed,
    /// Rate limited; no assistant message committed, loop may continue
    RateLimited,
}

/// One conversation: the provider, the fixed request parameters, and the
/// transcript. Owned by the caller and passed into each turn; no globals.
pub struct ChatSession<P> {
    provider: P,
    model: String,
    max_tokens: u32,
    history: ConversationHistory,
}

impl<P: CompletionProvider> ChatSession<P> {
    pub fn new(provider: P, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
            history: ConversationHistory::new(),
        }
    }

    /// The transcript recorded so far
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run one turn: append the input, stream the reply to `out` fragment
    /// by fragment, and commit the full reply to history once the stream
    /// completes.
    ///
    /// A rate-limit failure leaves the unanswered user message in history
    /// so it is resent with the next turn's input. Any other failure is
    /// returned as `Err` and ends the session.
    pub async fn run_turn(&mut self, input: &str, out: &mut impl Write) -> Result<TurnOutcome> {
        self.history.push_user(input);

        let mut stream = match self
            .provider
            .stream_chat(&self.model, self.max_tokens, &self.history)
            .await
        {
            Ok(stream) => stream,
            Err(e) if e.is_rate_limit() => return Ok(TurnOutcome::RateLimited),
            Err(e) => return Err(e.into()),
        };

        let mut response = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    write!(out, "{}", text)?;
                    out.flush()?;
                    response.push_str(&text);
                }
                Err(e) if e.is_rate_limit() => return Ok(TurnOutcome::RateLimited),
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!("reply committed ({} chars)", response.len());
        self.history.push_assistant(response);
        Ok(TurnOutcome::Completed)
    }
}

/// Check whether an input line ends the session
pub fn is_exit_command(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Drive the session until an exit command, end of input, or a fatal error.
///
/// Prompts, streamed replies, and per-turn warnings all go to `out`. A
/// fatal turn failure is printed and ends the loop; no further input is
/// consumed after it.
pub async fn run_loop<P: CompletionProvider>(
    session: &mut ChatSession<P>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            writeln!(out, "\nGoodbye!")?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            writeln!(out, "\nGoodbye!")?;
            break;
        }

        // Exit/empty checks use the trimmed copy; the message itself keeps
        // the line as typed.
        let text = line.trim_end_matches(['\n', '\r']);

        write!(out, "\nClaude: ")?;
        out.flush()?;

        match session.run_turn(text, out).await {
            Ok(TurnOutcome::Completed) => {
                // Close the reply line, then a blank turn separator.
                writeln!(out)?;
                writeln!(out)?;
            }
            Ok(TurnOutcome::RateLimited) => {
                writeln!(out)?;
                writeln!(
                    out,
                    "--- Rate limited by the API. Wait a moment and try again. ---"
                )?;
                writeln!(out)?;
            }
            Err(e) => {
                writeln!(out)?;
                writeln!(out, "An error occurred: {}", e)?;
                break;
            }
        }
    }

    Ok(())
}
