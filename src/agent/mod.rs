//! Agent module — core chat logic.
//!
//! This module contains:
//! - Message types sent to a backend
//! - LLM client trait and implementations
//! - Registry mapping nicknames to backends
//! - REPL loop driving the conversation
//!
//! # Adding a New Backend
//!
//! See [`registry`] for instructions.

mod message;
mod repl;

pub mod llm;
pub mod registry;

// Re-exports for convenience
pub use llm::{ChunkStream, GeminiClient, LlmClient, OllamaClient};
pub use message::{Message, Role};
pub use registry::SupportedAgent;
pub use repl::{Repl, ReplExit, FAREWELL, GREETING, PROMPT};
