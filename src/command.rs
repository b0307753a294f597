use crate::dispatch::CommandTable;
use crate::env::Environment;
use crate::error::ShellError;
use crate::monitor::SystemMonitor;
use crate::nl::{InterpretationResult, NlInterpreter};
use anyhow::Result;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// How processing of a line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran; `status` says whether it succeeded.
    Completed,
    /// The line was read as natural language and no rule matched it.
    NotUnderstood,
    /// Tokenizing, alias resolution or lookup failed.
    Failed(ShellError),
}

/// Everything a line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExitCode,
    pub stdout: String,
    pub stderr: String,
    pub outcome: Outcome,
    /// Set when the line was translated from natural language.
    pub interpretation: Option<InterpretationResult>,
}

impl ExecutionResult {
    pub fn completed(status: ExitCode, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            outcome: Outcome::Completed,
            interpretation: None,
        }
    }

    /// A successful result with no output.
    pub fn empty() -> Self {
        Self::completed(0, "", "")
    }

    pub fn failed(error: ShellError) -> Self {
        Self {
            status: error.status(),
            stdout: String::new(),
            stderr: format!("{}\n", error),
            outcome: Outcome::Failed(error),
            interpretation: None,
        }
    }

    pub fn not_understood(utterance: &str) -> Self {
        Self {
            status: 1,
            stdout: String::new(),
            stderr: format!("could not interpret: '{}'\n", utterance),
            outcome: Outcome::NotUnderstood,
            interpretation: None,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome == Outcome::Completed && self.status == 0
    }
}

/// What a running command can see and touch.
///
/// `stdout` and `stderr` collect the command's output; the environment is the
/// only mutable shell state.
pub struct Context<'a> {
    pub env: &'a mut Environment,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Registered commands, for `help` and `which`.
    pub table: &'a CommandTable,
    pub monitor: &'a dyn SystemMonitor,
    pub interpreter: &'a NlInterpreter,
}

impl<'a> Context<'a> {
    pub fn new(
        env: &'a mut Environment,
        table: &'a CommandTable,
        monitor: &'a dyn SystemMonitor,
        interpreter: &'a NlInterpreter,
    ) -> Self {
        Self {
            env,
            stdout: Vec::new(),
            stderr: Vec::new(),
            table,
            monitor,
            interpreter,
        }
    }

    /// Packs the collected output with `status`.
    pub fn finish(&mut self, status: ExitCode) -> ExecutionResult {
        ExecutionResult::completed(
            status,
            String::from_utf8_lossy(&std::mem::take(&mut self.stdout)).into_owned(),
            String::from_utf8_lossy(&std::mem::take(&mut self.stderr)).into_owned(),
        )
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode>;
}

/// Factory that creates a command instance from its arguments.
pub trait CommandFactory {
    /// Canonical name of the commands this factory builds.
    fn name(&self) -> &'static str;

    /// One-line description for `help`.
    fn summary(&self) -> &'static str;

    /// Argument synopsis, e.g. `cp [-r] <src>... <dst>`.
    fn usage(&self) -> &'static str;

    /// Build the command; argument errors become a command that reports them.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
