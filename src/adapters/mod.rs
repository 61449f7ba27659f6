//! Adapters module — the surfaces Kai talks to the user through.
//!
//! Each surface implements [`UserInteraction`] for uniform handling.
//!
//! # Supported Surfaces
//!
//! - **Console** — a real terminal: line editing, history, colour, Markdown
//! - **Stream** — pipes and redirected input: plain text, no banners
//!
//! The surface is chosen once, by [`pick_user_interaction`]. Nothing else
//! asks whether the session is interactive.

pub mod console;
pub mod stream;

use std::io::{self, IsTerminal};

use tracing::debug;

use crate::config::SessionConfig;
use crate::Result;

pub use console::{ConsoleInteraction, LineEditor};
pub use stream::StreamInteraction;

/// Interaction trait for user-facing surfaces.
pub trait UserInteraction {
    /// Kai's own messages: greeting, farewell.
    fn print_from_kai(&mut self, message: &str) -> Result<()>;

    /// Read the next input. `Ok(None)` means the input has ended;
    /// [`Error::Interrupted`](crate::Error::Interrupted) means the user hit Ctrl-C.
    fn read_from_user(&mut self, prompt: &str) -> Result<Option<String>>;

    /// A model response.
    fn print_from_llm(&mut self, message: &str) -> Result<()>;

    /// A non-fatal failure the user should see.
    fn print_error(&mut self, message: &str) -> Result<()>;

    /// Release the surface.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Console when a terminal is attached on both ends, stream otherwise.
pub fn pick_user_interaction(config: &SessionConfig) -> Result<Box<dyn UserInteraction>> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        debug!("Terminal attached; using console interaction");
        Ok(Box::new(ConsoleInteraction::new(&config.history_file)?))
    } else {
        debug!("No terminal; using stream interaction");
        Ok(Box::new(StreamInteraction::stdio()))
    }
}
