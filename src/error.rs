//! Error types for Kai

use thiserror::Error;

/// Result type alias for Kai operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit status for configuration problems (bad nickname, missing key, no daemon).
pub const CONFIGURATION_EXIT_CODE: i32 = 2;

/// Exit status following POSIX conventions for SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Errors that can occur in Kai
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown agent nickname: {0}")]
    UnknownAgent(String),

    #[error("Missing {0} environment variable")]
    MissingCredential(String),

    #[error("Is Ollama running locally at {0}?")]
    DaemonUnreachable(String),

    #[error("Ollama is sad: {0}")]
    DaemonUnhealthy(String),

    #[error("Invalid endpoint {0}: {1}")]
    InvalidEndpoint(String, String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("Interrupted")]
    Interrupted,
}

impl Error {
    /// Process exit status to terminate with when this error is fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownAgent(_)
            | Error::MissingCredential(_)
            | Error::DaemonUnreachable(_)
            | Error::InvalidEndpoint(..) => CONFIGURATION_EXIT_CODE,
            Error::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_exit_codes() {
        assert_eq!(Error::UnknownAgent("gpt".into()).exit_code(), 2);
        assert_eq!(Error::MissingCredential("GEMINI_API_KEY".into()).exit_code(), 2);
        assert_eq!(Error::DaemonUnreachable("http://localhost:11434/".into()).exit_code(), 2);
        assert_eq!(Error::DaemonUnhealthy("500 Internal Server Error".into()).exit_code(), 1);
        assert_eq!(Error::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_runtime_errors_exit_one() {
        assert_eq!(Error::Llm("quota".into()).exit_code(), 1);
        assert_eq!(Error::Io(std::io::Error::other("closed")).exit_code(), 1);
    }

    #[test]
    fn test_messages_name_the_problem() {
        assert_eq!(
            Error::UnknownAgent("gpt-9".into()).to_string(),
            "Unknown agent nickname: gpt-9"
        );
        assert_eq!(
            Error::MissingCredential("GEMINI_API_KEY".into()).to_string(),
            "Missing GEMINI_API_KEY environment variable"
        );
    }
}
