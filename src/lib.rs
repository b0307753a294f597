//! An interactive shell that takes either shell commands or plain-English
//! requests.
//!
//! Every input line goes through the [`Engine`]. Literal commands are
//! tokenized, alias-expanded and dispatched to a built-in or an external
//! program. Lines that read like natural language are first translated by the
//! rule-based [`NlInterpreter`] into a canonical command, which then takes
//! exactly the same path, so both kinds of input share one set of command
//! semantics.
//!
//! ```no_run
//! use natsh::{Engine, Environment};
//!
//! let mut sh = Engine::new(Environment::new());
//! let result = sh.run_line("create a new file called notes.txt");
//! assert_eq!(result.status, 0);
//! ```

pub mod alias;
mod builtin;
pub mod command;
pub mod dispatch;
pub mod engine;
pub mod env;
pub mod error;
pub mod external;
pub mod lexer;
pub mod monitor;
pub mod nl;
pub mod parser;
pub mod repl;

pub use command::{ExecutionResult, ExitCode, Outcome};
pub use dispatch::CommandTable;
pub use engine::{Classifier, Engine, Route};
pub use env::Environment;
pub use error::ShellError;
pub use external::{DelegateError, ExternalDelegate, ExternalOutput, ProcessDelegate};
pub use monitor::SystemMonitor;
pub use nl::{InterpretationResult, NlInterpreter};
