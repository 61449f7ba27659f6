//! Wire types for the Gemini and Ollama response bodies.
//!
//! Only the fields Kai reads are modelled; everything else is ignored.

use serde::Deserialize;

use crate::agent::message::Message;

/// One streamed Gemini response event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub error: Option<GeminiError>,
}

impl GeminiResponse {
    /// Text carried by the first candidate, parts concatenated.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A single response candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// Content block containing parts.
#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single part of the response.
#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<usize>,
    pub candidates_token_count: Option<usize>,
    pub total_token_count: Option<usize>,
}

/// Error object Gemini embeds in a stream or error body.
#[derive(Debug, Deserialize)]
pub struct GeminiError {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

/// One line of an Ollama `/api/chat` stream.
#[derive(Debug, Deserialize)]
pub struct OllamaChunk {
    pub message: Option<Message>,
    #[serde(default)]
    pub done: bool,
    pub error: Option<String>,
    pub eval_count: Option<usize>,
}
