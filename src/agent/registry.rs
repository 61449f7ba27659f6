//! Agent registry — maps nicknames to configured backends.
//!
//! # Adding a New Agent
//!
//! 1. Add a variant to [`SupportedAgent`]
//! 2. Give it a nickname in [`SupportedAgent::NICKNAMES`] (keep it sorted)
//! 3. Build its client in [`SupportedAgent::connect_with`]

use tracing::info;

use crate::config::SessionConfig;
use crate::error::Error;
use crate::Result;

use super::llm::{GeminiClient, LlmClient, OllamaClient};

/// Backends Kai knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedAgent {
    GeminiFlash,
    GeminiPro,
    Ollama,
}

impl SupportedAgent {
    /// Every nickname, sorted.
    pub const NICKNAMES: [&'static str; 3] = ["gemini-flash", "gemini-pro", "ollama"];

    /// Resolve a nickname, ignoring case. Never touches the network.
    pub fn resolve(nickname: &str) -> Result<Self> {
        match nickname.to_ascii_lowercase().as_str() {
            "gemini-flash" => Ok(Self::GeminiFlash),
            "gemini-pro" => Ok(Self::GeminiPro),
            "ollama" => Ok(Self::Ollama),
            _ => Err(Error::UnknownAgent(nickname.to_string())),
        }
    }

    pub fn nickname(&self) -> &'static str {
        match self {
            Self::GeminiFlash => "gemini-flash",
            Self::GeminiPro => "gemini-pro",
            Self::Ollama => "ollama",
        }
    }

    /// Model identifier the backend is asked for.
    pub fn model(&self) -> &'static str {
        match self {
            Self::GeminiFlash => "gemini-2.5-flash",
            Self::GeminiPro => "gemini-2.5-pro",
            Self::Ollama => "llama3.2",
        }
    }

    /// Build a ready client, running the backend's preflight.
    pub async fn connect(&self, config: &SessionConfig) -> Result<Box<dyn LlmClient>> {
        self.connect_with(config, |var| std::env::var(var).ok()).await
    }

    /// Like [`connect`](Self::connect), resolving credentials through `lookup`.
    pub async fn connect_with(
        &self,
        config: &SessionConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn LlmClient>> {
        info!("Connecting agent {} ({})", self.nickname(), self.model());

        let client: Box<dyn LlmClient> = match self {
            Self::GeminiFlash | Self::GeminiPro => Box::new(GeminiClient::from_lookup(
                self.model(),
                &config.system_prompt,
                lookup,
            )?),
            Self::Ollama => Box::new(
                OllamaClient::connect(
                    config.ollama_endpoint.clone(),
                    self.model(),
                    &config.system_prompt,
                )
                .await?,
            ),
        };

        Ok(client)
    }
}
