//! Kai - a rich command-line chat bot
//!
//! This library provides the pieces of the `kai` binary: backend clients for
//! Gemini and Ollama, the terminal and stream user surfaces, and the REPL
//! that ties them together.

pub mod adapters;
pub mod agent;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
