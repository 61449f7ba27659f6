//! Non-interactive surface for pipes and redirected input.

use std::io::{self, BufRead, Read, Stderr, StdinLock, Stdout, Write};

use crate::Result;

use super::UserInteraction;

/// Plain-text interaction: no banners, no styling, whole input as one message.
pub struct StreamInteraction<R, W, E> {
    input: R,
    output: W,
    errors: E,
    exhausted: bool,
}

impl StreamInteraction<StdinLock<'static>, Stdout, Stderr> {
    /// Interaction over the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> StreamInteraction<R, W, E> {
    pub fn new(input: R, output: W, errors: E) -> Self {
        Self {
            input,
            output,
            errors,
            exhausted: false,
        }
    }
}

impl<R: BufRead, W: Write, E: Write> UserInteraction for StreamInteraction<R, W, E> {
    fn print_from_kai(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    /// Everything left on the input, lines joined with `\n`. An empty or
    /// already consumed stream yields `None`. Invalid UTF-8 is replaced, not fatal.
    fn read_from_user(&mut self, _prompt: &str) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        self.exhausted = true;

        let mut bytes = Vec::new();
        self.input.read_to_end(&mut bytes)?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&bytes);
        Ok(Some(text.lines().collect::<Vec<_>>().join("\n")))
    }

    fn print_from_llm(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()?;
        Ok(())
    }

    fn print_error(&mut self, message: &str) -> Result<()> {
        writeln!(self.errors, "kai: {message}")?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.output.flush()?;
        self.errors.flush()?;
        Ok(())
    }
}
