//! Per-line orchestration: classify, optionally interpret, then run the
//! literal pipeline (tokenize → resolve aliases → parse → dispatch).

use crate::alias;
use crate::command::{Context, ExecutionResult, ExitCode};
use crate::dispatch::CommandTable;
use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer;
use crate::monitor::{SystemMonitor, default_monitor};
use crate::nl::{InterpretationResult, NlInterpreter};
use crate::parser;
use tracing::{debug, info};

/// Decides which lines are read as natural language.
///
/// A line is literal when its first word looks like a path, a flag or quoted
/// shell syntax, or names a registered command or alias. Anything else goes
/// to the interpreter. When no rule matches, the line is still run literally
/// if `external_fallback` is set and the first word is an executable on
/// `PATH`, or if it is a single word or carries flags (so unknown commands
/// are reported as such). Otherwise it is not understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    /// Try the interpreter at all.
    pub natural_language: bool,
    /// Run unmatched lines whose first word is on `PATH`.
    pub external_fallback: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            natural_language: true,
            external_fallback: true,
        }
    }
}

/// Where a line goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Literal,
    Interpreted {
        command: String,
        interpretation: InterpretationResult,
    },
    NotUnderstood,
}

/// Called with every successful interpretation before its command runs.
pub type InterpretationListener = Box<dyn FnMut(&InterpretationResult)>;

/// Owns the session state and runs lines against it, one at a time.
pub struct Engine {
    env: Environment,
    table: CommandTable,
    monitor: Box<dyn SystemMonitor>,
    interpreter: NlInterpreter,
    classifier: Classifier,
    listener: Option<InterpretationListener>,
}

impl Engine {
    /// An engine with every built-in, real processes and the platform monitor.
    pub fn new(env: Environment) -> Self {
        Self::with_parts(env, CommandTable::with_builtins(), default_monitor())
    }

    pub fn with_parts(env: Environment, table: CommandTable, monitor: Box<dyn SystemMonitor>) -> Self {
        Self {
            env,
            table,
            monitor,
            interpreter: NlInterpreter::new(),
            classifier: Classifier::default(),
            listener: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Registers the callback that announces interpretations; replaces any
    /// previous one.
    pub fn on_interpret(&mut self, listener: impl FnMut(&InterpretationResult) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    pub fn exit_requested(&self) -> Option<ExitCode> {
        self.env.exit_requested
    }

    pub fn classify(&self, line: &str) -> Route {
        let Some(first) = line.split_whitespace().next() else {
            return Route::Literal;
        };
        if is_path_like(first) || is_shell_syntax(first) {
            return Route::Literal;
        }
        if self.table.contains(first) || self.env.aliases.contains(first) {
            return Route::Literal;
        }
        if !self.classifier.natural_language {
            return Route::Literal;
        }

        let interpretation = self.interpreter.interpret(line);
        if let Some(command) = interpretation.command.clone() {
            return Route::Interpreted {
                command,
                interpretation,
            };
        }

        if self.classifier.external_fallback && self.table.external().lookup(first, &self.env).is_some() {
            debug!(command = first, "no rule matched, falling back to external command");
            return Route::Literal;
        }
        let mut rest = line.split_whitespace().skip(1).peekable();
        if rest.peek().is_none() || rest.any(|word| word.starts_with('-')) {
            return Route::Literal;
        }
        Route::NotUnderstood
    }

    /// Runs one input line. Never fails: every problem ends up in the result.
    pub fn run_line(&mut self, line: &str) -> ExecutionResult {
        if line.trim().is_empty() {
            return ExecutionResult::empty();
        }
        self.env.history.push(line.to_string());
        debug!(line, "received");

        match self.classify(line) {
            Route::Literal => self.eval(line),
            Route::Interpreted {
                command,
                interpretation,
            } => {
                info!(
                    utterance = line,
                    rule = interpretation.rule,
                    %command,
                    action = interpretation.action,
                    "interpreted natural language"
                );
                if let Some(listener) = self.listener.as_mut() {
                    listener(&interpretation);
                }
                let mut result = self.eval(&command);
                result.interpretation = Some(interpretation);
                result
            }
            Route::NotUnderstood => {
                debug!(line, "not understood");
                ExecutionResult::not_understood(line.trim())
            }
        }
    }

    /// Runs `line` as a literal command, skipping classification.
    pub fn eval(&mut self, line: &str) -> ExecutionResult {
        match self.eval_literal(line) {
            Ok(result) => {
                debug!(status = result.status, "completed");
                result
            }
            Err(err) => {
                debug!(%err, "failed");
                ExecutionResult::failed(err)
            }
        }
    }

    fn eval_literal(&mut self, line: &str) -> Result<ExecutionResult, ShellError> {
        let tokens = lexer::tokenize(line, &self.env)?;
        debug!(count = tokens.len(), "tokenized");
        let tokens = alias::resolve(tokens, &self.env.aliases)?;
        debug!(count = tokens.len(), "aliases resolved");
        let Some(cmd) = parser::parse(line, tokens)? else {
            return Ok(ExecutionResult::empty());
        };
        debug!(command = %cmd.name, args = ?cmd.args, "parsed");

        let mut ctx = Context::new(&mut self.env, &self.table, self.monitor.as_ref(), &self.interpreter);
        self.table.dispatch(&cmd, &mut ctx)
    }
}

fn is_path_like(word: &str) -> bool {
    word.starts_with('/')
        || word.starts_with("./")
        || word.starts_with("../")
        || word == "~"
        || word.starts_with("~/")
        || word.starts_with('-')
}

/// Quotes, escapes or expansions in the first word only make sense to the shell.
fn is_shell_syntax(word: &str) -> bool {
    word.contains(['\'', '"', '\\', '$'])
}
