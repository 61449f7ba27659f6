//! Interactive terminal: line editing, persistent history, colour and Markdown.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::history::{FileHistory, History};
use rustyline::{Config, DefaultEditor};
use tracing::{debug, warn};

use crate::error::Error;
use crate::ui;
use crate::Result;

use super::UserInteraction;

/// The line-editing surface behind a [`ConsoleInteraction`].
pub trait LineEditor {
    /// Read one line, showing `prompt`.
    fn read_line(&mut self, prompt: &str) -> rustyline::Result<String>;

    /// The editor's recall history, persisted through rustyline's file format.
    fn history(&mut self) -> &mut FileHistory;
}

impl LineEditor for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.readline(prompt)
    }

    fn history(&mut self) -> &mut FileHistory {
        self.history_mut()
    }
}

/// User interaction over a real terminal.
pub struct ConsoleInteraction<L = DefaultEditor> {
    editor: L,
    history_file: PathBuf,
}

impl ConsoleInteraction<DefaultEditor> {
    /// Open the terminal and seed recall from `history_file`.
    pub fn new(history_file: &Path) -> Result<Self> {
        // Repeated questions are still worth recording
        let config = Config::builder().history_ignore_dups(false)?.build();
        Self::with_editor(DefaultEditor::with_config(config)?, history_file)
    }
}

impl<L: LineEditor> ConsoleInteraction<L> {
    pub fn with_editor(mut editor: L, history_file: &Path) -> Result<Self> {
        match editor.history().load(history_file) {
            Ok(()) => debug!(
                "Loaded {} history entries from {:?}",
                editor.history().len(),
                history_file
            ),
            Err(ReadlineError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {:?} yet", history_file)
            }
            Err(e) => warn!("Ignoring unreadable history {:?}: {e}", history_file),
        }

        Ok(Self {
            editor,
            history_file: history_file.to_path_buf(),
        })
    }

    /// Record `entry` for recall and flush it to the history file right away.
    fn remember(&mut self, entry: &str) -> Result<()> {
        self.editor.history().add(entry)?;

        if let Some(parent) = self.history_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.editor.history().append(&self.history_file)?;
        Ok(())
    }
}

impl<L: LineEditor> UserInteraction for ConsoleInteraction<L> {
    fn print_from_kai(&mut self, message: &str) -> Result<()> {
        println!("{}", ui::kai_says(message));
        Ok(())
    }

    fn read_from_user(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.read_line(&ui::kai_says(prompt).to_string()) {
            Ok(line) => {
                let entry = line.trim();
                if !entry.is_empty() {
                    if let Err(e) = self.remember(entry) {
                        warn!("Could not write history {:?}: {e}", self.history_file);
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Err(Error::Interrupted),
            Err(e) => Err(e.into()),
        }
    }

    fn print_from_llm(&mut self, message: &str) -> Result<()> {
        println!("{}", ui::llm_says(message));
        Ok(())
    }

    fn print_error(&mut self, message: &str) -> Result<()> {
        eprintln!("{}", ui::error_text(message));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }
}
