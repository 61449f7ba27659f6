//! Kai CLI entry point

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use kai::adapters::pick_user_interaction;
use kai::agent::{Repl, ReplExit, SupportedAgent};
use kai::config::{
    self, SessionConfig, DEFAULT_AGENT_NICKNAME, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_SYSTEM_PROMPT,
};
use kai::error::INTERRUPTED_EXIT_CODE;
use kai::ui;

#[derive(Parser)]
#[command(name = "kai")]
#[command(about = "🤖 Kai - A rich command-line chat bot for Gemini and Ollama")]
#[command(version)]
struct Cli {
    /// Pick a model agent
    #[arg(
        short = 'M',
        long,
        default_value = DEFAULT_AGENT_NICKNAME,
        ignore_case = true,
        value_parser = PossibleValuesParser::new(SupportedAgent::NICKNAMES)
    )]
    agent_nickname: String,

    /// Set the history file for previous user-entered prompts
    #[arg(short = 'H', long, default_value_os_t = config::default_history_file())]
    history_file: PathBuf,

    /// Set the system prompt
    #[arg(short = 'S', long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system_prompt: String,

    /// Base URL of the local Ollama daemon
    #[arg(
        long,
        env = "KAI_OLLAMA_ENDPOINT",
        default_value = DEFAULT_OLLAMA_ENDPOINT,
        value_parser = parse_endpoint
    )]
    ollama_endpoint: Url,
}

impl Cli {
    fn into_config(self) -> SessionConfig {
        SessionConfig {
            agent_nickname: self.agent_nickname,
            history_file: self.history_file,
            system_prompt: self.system_prompt,
            ollama_endpoint: self.ollama_endpoint,
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, String> {
    config::parse_endpoint(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    // Initialize logging; stderr keeps it out of piped model output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("KAI_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Ctrl-C outside the line editor (e.g. mid-request) ends the process at once
    if let Err(e) = ctrlc::set_handler(|| std::process::exit(INTERRUPTED_EXIT_CODE)) {
        tracing::warn!("Could not install Ctrl-C handler: {e}");
    }

    let cli = Cli::parse();

    let code = match run(cli.into_config()).await {
        Ok(exit) => exit.code(),
        Err(e) => {
            ui::print_error(&e.to_string());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(config: SessionConfig) -> kai::Result<ReplExit> {
    let agent = SupportedAgent::resolve(&config.agent_nickname)?;
    let client = agent.connect(&config).await?;
    let interaction = pick_user_interaction(&config)?;

    Repl::new(client, interaction).run().await
}
