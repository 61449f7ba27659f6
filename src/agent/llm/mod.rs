//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait for swappable backends
//! - Concrete implementations: Gemini (API key) and a local Ollama daemon
//!
//! Every client is bound to one model and one system prompt when it is
//! constructed. Construction is where preflight happens (credential lookup,
//! liveness probe), so a client that exists is a client that can be asked.

mod types;

pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::debug;

use crate::Result;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

/// Text chunks of a single response, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<String>>;

/// LLM client trait — swappable backend abstraction.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one user message and stream the response text back.
    async fn stream(&self, message: &str) -> Result<ChunkStream>;

    /// Send one user message and wait for the whole response.
    async fn run(&self, message: &str) -> Result<String> {
        let mut chunks = self.stream(message).await?;
        let mut response = String::new();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            debug!("Received chunk: {} chars", chunk.len());
            response.push_str(&chunk);
        }

        Ok(response)
    }

    /// Model identifier this client talks to.
    fn model(&self) -> &str;
}

/// Fake LLM client for testing.
#[cfg(test)]
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<Vec<String>>>>,
    received: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl FakeLlmClient {
    /// Create with predefined text responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.into_iter().map(|s| Ok(vec![s.to_string()])).collect())
    }

    /// Create with responses that are either chunk lists or turn failures.
    pub fn scripted(responses: Vec<Result<Vec<String>>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
            received: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Handle onto the messages the client has been sent.
    pub fn received(&self) -> std::sync::Arc<std::sync::Mutex<Vec<String>>> {
        std::sync::Arc::clone(&self.received)
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn stream(&self, message: &str) -> Result<ChunkStream> {
        self.received.lock().unwrap().push(message.to_string());

        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(crate::error::Error::Llm("No more fake responses".to_string())))?;

        Ok(futures_util::stream::iter(next.into_iter().map(Ok)).boxed())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}
