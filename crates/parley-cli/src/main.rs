//! parley - streaming chat CLI for the Anthropic API

mod chat;
mod config;

use chat::ChatSession;
use clap::Parser;
use parley_ai::providers::AnthropicProvider;
use std::io;

const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// parley - interactive chat with Claude
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: claude-3-sonnet-20240229)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum output tokens per reply
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("parley=debug")
            .init();
    }

    // Load config file
    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let model = args
        .model
        .or(cfg.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let max_tokens = args.max_tokens.or(cfg.max_tokens).unwrap_or(DEFAULT_MAX_TOKENS);

    // Fail fast when no credential is available: one diagnostic, no prompt.
    let provider = match AnthropicProvider::from_env() {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!(
                "Authentication error: please set the ANTHROPIC_API_KEY environment variable."
            );
            eprintln!("Details: {}", e);
            std::process::exit(1);
        }
    };

    let model_short = model.split('/').next_back().unwrap_or(&model);
    println!("--- parley ({}) ---", model_short);
    println!("Type 'exit' or 'quit' to end the chat.");
    println!("{}", "-".repeat(40));

    let mut session = ChatSession::new(provider, model, max_tokens);
    chat::run_loop(&mut session, io::stdin().lock(), &mut io::stdout()).await
}
