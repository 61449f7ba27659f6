//! Gemini LLM client implementation (API key authentication).

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::agent::message::{turn, Message, Role};
use crate::config::GEMINI_API_KEY_VAR;
use crate::error::Error;
use crate::Result;

use super::types::GeminiResponse;
use super::{ChunkStream, LlmClient};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client using API key authentication.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    system_prompt: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with API key.
    pub fn new(api_key: &str, model: &str, system_prompt: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            base_url: GEMINI_API_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Create a client, resolving the API key through `lookup`.
    ///
    /// Fails with [`Error::MissingCredential`] without touching the network
    /// when the key is absent or empty.
    pub fn from_lookup(
        model: &str,
        system_prompt: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = lookup(GEMINI_API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::MissingCredential(GEMINI_API_KEY_VAR.to_string()))?;

        Ok(Self::new(&api_key, model, system_prompt))
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(&self, messages: &[Message]) -> Value {
        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                json!({
                    "role": role,
                    "parts": [{"text": m.content}]
                })
            })
            .collect();

        let mut request = json!({ "contents": contents });

        if let Some(system) = messages.iter().find(|m| m.role == Role::System) {
            request["systemInstruction"] = json!({
                "parts": [{"text": system.content}]
            });
        }

        request
    }
}

/// Decode one SSE `data:` payload into the text it carries.
fn parse_event(data: &str) -> Result<String> {
    let response: GeminiResponse = serde_json::from_str(data)?;

    if let Some(error) = &response.error {
        let status = error
            .status
            .clone()
            .or_else(|| error.code.map(|c| c.to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        return Err(Error::Llm(format!(
            "Gemini API error ({status}): {}",
            error.message.as_deref().unwrap_or_default()
        )));
    }

    if let Some(reason) = response.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
        debug!("Gemini finished: {reason}");
    }
    if let Some(usage) = &response.usage_metadata {
        debug!(
            "Gemini usage: prompt={:?} completion={:?} total={:?}",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }

    Ok(response.text())
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn stream(&self, message: &str) -> Result<ChunkStream> {
        let request = self.build_request(&turn(&self.system_prompt, message));

        debug!("Sending turn to Gemini model {}", self.model);

        let response = self
            .client
            .post(self.build_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::Llm(format!("Gemini API error ({status}): {error_text}")));
        }

        let events = response.bytes_stream().eventsource().map(|event| match event {
            Ok(event) => parse_event(&event.data),
            Err(e) => Err(Error::Llm(format!("Gemini stream error: {e}"))),
        });

        Ok(events.boxed())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
