//! Hard failures that abort processing of a single input line.
//!
//! Built-in handler failures are not represented here: they are converted to a
//! non-zero [`ExecutionResult`](crate::command::ExecutionResult) by the handler
//! wrapper and never leave the dispatch table as errors.

use crate::command::ExitCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The line could not be tokenized or parsed.
    #[error("syntax error at position {position}: {message}\n  {line}")]
    Syntax {
        /// The offending input line, verbatim.
        line: String,
        /// Character offset of the problem within `line`.
        position: usize,
        message: String,
    },

    /// Alias expansion did not terminate within the size of the alias table.
    #[error("alias cycle detected while expanding '{name}'")]
    AliasCycle { name: String },

    /// Neither a built-in nor an executable on the search path.
    #[error("command not found: {name}")]
    CommandNotFound { name: String },
}

impl ShellError {
    pub(crate) fn syntax(line: &str, position: usize, message: impl Into<String>) -> Self {
        ShellError::Syntax {
            line: line.to_string(),
            position,
            message: message.into(),
        }
    }

    /// Exit status reported for a line that failed with this error.
    pub fn status(&self) -> ExitCode {
        match self {
            ShellError::Syntax { .. } => 2,
            ShellError::AliasCycle { .. } => 1,
            ShellError::CommandNotFound { .. } => 127,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = ShellError::CommandNotFound {
            name: "frobnicate".into(),
        };
        assert_eq!(err.to_string(), "command not found: frobnicate");
        assert_eq!(err.status(), 127);

        let err = ShellError::AliasCycle { name: "ls".into() };
        assert!(err.to_string().contains("'ls'"));
    }

    #[test]
    fn syntax_error_echoes_line() {
        let err = ShellError::syntax("echo \"abc", 5, "unterminated quote '\"'");
        let text = err.to_string();
        assert!(text.contains("position 5"));
        assert!(text.contains("echo \"abc"));
        assert_eq!(err.status(), 2);
    }
}
