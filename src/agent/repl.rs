//! REPL loop - core turn processing

use tracing::{debug, info};

use crate::adapters::UserInteraction;
use crate::error::{Error, INTERRUPTED_EXIT_CODE};
use crate::Result;

use super::llm::LlmClient;

pub const GREETING: &str = "🤖 Kai is ready. Enter 'exit' to quit.";
pub const FAREWELL: &str = "Goodbye! 👋";
pub const PROMPT: &str = "> ";

/// How a REPL session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    /// `exit` or end of input.
    Closed,
    /// Ctrl-C at the prompt. No farewell was printed.
    Interrupted,
}

impl ReplExit {
    pub fn code(self) -> i32 {
        match self {
            ReplExit::Closed => 0,
            ReplExit::Interrupted => INTERRUPTED_EXIT_CODE,
        }
    }
}

/// The REPL owns the backend client and the user surface for its lifetime;
/// both are released when [`run`](Repl::run) returns.
pub struct Repl {
    client: Box<dyn LlmClient>,
    interaction: Box<dyn UserInteraction>,
}

impl Repl {
    pub fn new(client: Box<dyn LlmClient>, interaction: Box<dyn UserInteraction>) -> Self {
        Self {
            client,
            interaction,
        }
    }

    /// Run turns until the user leaves.
    ///
    /// A failed turn is reported and the loop keeps reading; only I/O
    /// failures on the user surface end the session with an error.
    pub async fn run(mut self) -> Result<ReplExit> {
        info!("Starting REPL with model {}", self.client.model());
        self.interaction.print_from_kai(GREETING)?;

        let exit = loop {
            let line = match self.interaction.read_from_user(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.interaction.print_from_kai(FAREWELL)?;
                    break ReplExit::Closed;
                }
                Err(Error::Interrupted) => break ReplExit::Interrupted,
                Err(e) => return Err(e),
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") {
                self.interaction.print_from_kai(FAREWELL)?;
                break ReplExit::Closed;
            }

            debug!("Dispatching turn: {} chars", input.len());
            match self.client.run(input).await {
                Ok(response) => self.interaction.print_from_llm(&response)?,
                Err(e) => {
                    debug!("Turn failed: {e}");
                    self.interaction.print_error(&e.to_string())?;
                }
            }
        };

        info!("REPL finished: {exit:?}");
        self.interaction.close()?;
        Ok(exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::console::tests::{saved_history, ScriptedEditor};
    use crate::adapters::{ConsoleInteraction, StreamInteraction};
    use crate::agent::llm::FakeLlmClient;
    use rustyline::error::ReadlineError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::{Cursor, Write};
    use std::rc::Rc;

    #[derive(Default)]
    struct Transcript {
        kai: Vec<String>,
        llm: Vec<String>,
        errors: Vec<String>,
        closed: bool,
    }

    enum Step {
        Line(&'static str),
        Interrupt,
    }

    struct ScriptedInteraction {
        steps: VecDeque<Step>,
        transcript: Rc<RefCell<Transcript>>,
    }

    fn scripted(steps: Vec<Step>) -> (Box<dyn UserInteraction>, Rc<RefCell<Transcript>>) {
        let transcript = Rc::new(RefCell::new(Transcript::default()));
        let interaction = ScriptedInteraction {
            steps: steps.into(),
            transcript: Rc::clone(&transcript),
        };
        (Box::new(interaction), transcript)
    }

    impl UserInteraction for ScriptedInteraction {
        fn print_from_kai(&mut self, message: &str) -> Result<()> {
            self.transcript.borrow_mut().kai.push(message.to_string());
            Ok(())
        }

        fn read_from_user(&mut self, _prompt: &str) -> Result<Option<String>> {
            match self.steps.pop_front() {
                Some(Step::Line(line)) => Ok(Some(line.to_string())),
                Some(Step::Interrupt) => Err(Error::Interrupted),
                None => Ok(None),
            }
        }

        fn print_from_llm(&mut self, message: &str) -> Result<()> {
            self.transcript.borrow_mut().llm.push(message.to_string());
            Ok(())
        }

        fn print_error(&mut self, message: &str) -> Result<()> {
            self.transcript.borrow_mut().errors.push(message.to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.transcript.borrow_mut().closed = true;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_exit_any_case_says_goodbye() {
        for word in ["exit", "Exit", "EXIT", "  exit  "] {
            let client = FakeLlmClient::new(vec![]);
            let received = client.received();
            let (interaction, transcript) = scripted(vec![Step::Line(word), Step::Line("never sent")]);

            let exit = Repl::new(Box::new(client), interaction).run().await.unwrap();

            assert_eq!(exit, ReplExit::Closed);
            assert_eq!(exit.code(), 0);
            assert_eq!(transcript.borrow().kai, vec![GREETING, FAREWELL]);
            assert!(transcript.borrow().closed);
            assert!(received.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_turns_are_trimmed_and_answered() {
        let client = FakeLlmClient::new(vec!["Hello, human!", "Rust is a language."]);
        let received = client.received();
        let (interaction, transcript) = scripted(vec![
            Step::Line("  hi  "),
            Step::Line(""),
            Step::Line("what is rust?"),
        ]);

        let exit = Repl::new(Box::new(client), interaction).run().await.unwrap();

        assert_eq!(exit, ReplExit::Closed);
        assert_eq!(*received.lock().unwrap(), vec!["hi", "what is rust?"]);
        assert_eq!(
            transcript.borrow().llm,
            vec!["Hello, human!", "Rust is a language."]
        );
        // End of input still says goodbye; the stream surface is what drops it.
        assert_eq!(transcript.borrow().kai, vec![GREETING, FAREWELL]);
    }

    #[tokio::test]
    async fn test_interrupt_skips_farewell() {
        let client = FakeLlmClient::new(vec!["first answer"]);
        let (interaction, transcript) = scripted(vec![
            Step::Line("question"),
            Step::Interrupt,
            Step::Line("never read"),
        ]);

        let exit = Repl::new(Box::new(client), interaction).run().await.unwrap();

        assert_eq!(exit, ReplExit::Interrupted);
        assert_eq!(exit.code(), 130);
        assert_eq!(transcript.borrow().kai, vec![GREETING]);
        assert_eq!(transcript.borrow().llm, vec!["first answer"]);
        assert!(transcript.borrow().closed);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_looping() {
        let client = FakeLlmClient::scripted(vec![
            Err(Error::Llm("quota exceeded".into())),
            Ok(vec!["recovered".to_string()]),
        ]);
        let (interaction, transcript) =
            scripted(vec![Step::Line("first"), Step::Line("second"), Step::Line("exit")]);

        let exit = Repl::new(Box::new(client), interaction).run().await.unwrap();

        assert_eq!(exit, ReplExit::Closed);
        assert_eq!(transcript.borrow().errors, vec!["LLM error: quota exceeded"]);
        assert_eq!(transcript.borrow().llm, vec!["recovered"]);
    }

    #[tokio::test]
    async fn test_non_interactive_end_of_input_is_silent() {
        let output = SharedBuffer::default();
        let errors = SharedBuffer::default();
        let interaction = StreamInteraction::new(
            Cursor::new(b"tell me a joke\n".to_vec()),
            output.clone(),
            errors.clone(),
        );
        let client = FakeLlmClient::new(vec!["Why did the crab never share? Because he's shellfish."]);
        let received = client.received();

        let exit = Repl::new(Box::new(client), Box::new(interaction)).run().await.unwrap();

        assert_eq!(exit.code(), 0);
        assert_eq!(*received.lock().unwrap(), vec!["tell me a joke"]);
        assert_eq!(
            output.contents(),
            "Why did the crab never share? Because he's shellfish.\n"
        );
        assert_eq!(errors.contents(), "");
    }

    #[tokio::test]
    async fn test_every_accepted_line_lands_in_history_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".kai_history");
        let editor = ScriptedEditor::new(vec![
            Ok("  what is rust?  ".to_string()),
            Ok("".to_string()),
            Ok("and cargo?".to_string()),
            Ok("what is rust?".to_string()),
            Ok("what is rust?".to_string()),
            Err(ReadlineError::Eof),
        ]);
        let console = ConsoleInteraction::with_editor(editor, &path).unwrap();
        let client = FakeLlmClient::new(vec![
            "A language.",
            "A build tool.",
            "Still a language.",
            "Yes, still.",
        ]);

        let exit = Repl::new(Box::new(client), Box::new(console)).run().await.unwrap();

        assert_eq!(exit, ReplExit::Closed);
        assert_eq!(
            saved_history(&path),
            vec!["what is rust?", "and cargo?", "what is rust?", "what is rust?"]
        );
    }
}
