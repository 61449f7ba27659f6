//! Session configuration and defaults

use std::path::PathBuf;

use url::Url;

use crate::error::Error;
use crate::Result;

/// Persona used when no system prompt is given.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are Kai, an AI assistant. Your personality is friendly and helpful.";

/// Nickname selected when `--agent-nickname` is omitted.
pub const DEFAULT_AGENT_NICKNAME: &str = "gemini-flash";

/// Where a local Ollama daemon listens by default.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Everything decided at process start. Immutable once built.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend nickname, matched case-insensitively
    pub agent_nickname: String,

    /// Append-only log of prior interactive inputs
    pub history_file: PathBuf,

    /// System prompt sent with every turn
    pub system_prompt: String,

    /// Base URL of the local Ollama daemon
    pub ollama_endpoint: Url,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent_nickname: DEFAULT_AGENT_NICKNAME.to_string(),
            history_file: default_history_file(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            ollama_endpoint: default_ollama_endpoint(),
        }
    }
}

/// `~/.kai_history`, or `./.kai_history` when no home directory is known.
pub fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kai_history")
}

fn default_ollama_endpoint() -> Url {
    // The constant is a valid absolute URL.
    Url::parse(DEFAULT_OLLAMA_ENDPOINT).expect("default Ollama endpoint parses")
}

/// Parse a daemon endpoint, rejecting anything that is not an http(s) URL.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidEndpoint(raw.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidEndpoint(
            raw.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}
