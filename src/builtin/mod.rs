//! Built-in commands known to the shell at compile time.
//!
//! Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
//! in-process against the session [`Environment`](crate::env::Environment).
//! They never touch the process working directory; paths resolve through
//! [`Environment::resolve_path`](crate::env::Environment::resolve_path).

use crate::command::{CommandFactory, Context, ExecutableCommand, ExitCode};
use crate::dispatch::CommandTable;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::{self, Write};
use std::marker::PhantomData;

pub mod files;
pub mod session;
pub mod system;

pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// One line for `help`.
    fn summary() -> &'static str;

    /// Argument synopsis for `help`.
    fn usage() -> &'static str;

    /// Executes the command, writing into `ctx.stdout` / `ctx.stderr`.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode> {
        match T::execute(*self, ctx) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(ctx.stderr, "{}: {:#}", T::name(), e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let out = if self.is_error { &mut ctx.stderr } else { &mut ctx.stdout };
        writeln!(out, "{}", self.output.trim_end())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

/// Builds `T` from arguments.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn summary(&self) -> &'static str {
        T::summary()
    }

    fn usage(&self) -> &'static str {
        T::usage()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        // argh reads a bare `help` word as a help request; keep it an operand.
        let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 1);
        let mut options_ended = false;
        for &arg in args {
            if arg == "--" {
                options_ended = true;
            } else if arg == "help" && !options_ended {
                argv.push("--");
                options_ended = true;
            }
            argv.push(arg);
        }

        match T::from_args(&[T::name()], &argv) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        }
    }
}

fn register<T: BuiltinCommand + 'static>(table: &mut CommandTable) {
    table.register_builtin(Box::new(Factory::<T>::default()));
}

/// Registers every built-in.
pub fn register_all(table: &mut CommandTable) {
    register::<session::Pwd>(table);
    register::<session::Cd>(table);
    register::<session::Echo>(table);
    register::<session::Exit>(table);
    register::<session::Export>(table);
    register::<session::Env>(table);
    register::<session::Alias>(table);
    register::<session::Unalias>(table);
    register::<session::Which>(table);
    register::<session::History>(table);
    register::<session::Help>(table);
    register::<session::Date>(table);
    register::<session::Whoami>(table);
    register::<session::Ai>(table);

    register::<files::Ls>(table);
    register::<files::Mkdir>(table);
    register::<files::Rmdir>(table);
    register::<files::Rm>(table);
    register::<files::Cp>(table);
    register::<files::Mv>(table);
    register::<files::Touch>(table);
    register::<files::Cat>(table);
    register::<files::Head>(table);
    register::<files::Tail>(table);
    register::<files::Find>(table);
    register::<files::Grep>(table);
    register::<files::Wc>(table);

    register::<system::Free>(table);
    register::<system::Df>(table);
    register::<system::Ps>(table);
    register::<system::Uptime>(table);
    register::<system::Lscpu>(table);
}

/// The wording coreutils uses for common I/O failures.
pub(crate) fn io_reason(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::AlreadyExists => "File exists".to_string(),
        io::ErrorKind::NotADirectory => "Not a directory".to_string(),
        io::ErrorKind::IsADirectory => "Is a directory".to_string(),
        io::ErrorKind::DirectoryNotEmpty => "Directory not empty".to_string(),
        _ => err.to_string(),
    }
}

/// Writes `name: message` to the command's stderr.
pub(crate) fn report(ctx: &mut Context<'_>, name: &str, message: impl std::fmt::Display) -> io::Result<()> {
    writeln!(ctx.stderr, "{}: {}", name, message)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::command::{Context, ExecutionResult};
    use crate::dispatch::CommandTable;
    use crate::dispatch::fake::FakeDelegate;
    use crate::env::Environment;
    use crate::monitor::fake::FakeMonitor;
    use crate::nl::NlInterpreter;
    use crate::parser::ParsedCommand;
    use std::fs;
    use std::path::Path;

    /// A table backed by a delegate that knows nothing.
    pub fn table() -> CommandTable {
        CommandTable::with_builtins_and_delegate(Box::new(FakeDelegate::default()))
    }

    /// Runs one command line's worth of words through the table.
    pub fn run(env: &mut Environment, name: &str, args: &[&str]) -> ExecutionResult {
        let table = table();
        let interpreter = NlInterpreter::new();
        let mut ctx = Context::new(env, &table, &FakeMonitor, &interpreter);
        table
            .dispatch(&ParsedCommand::new(name, args), &mut ctx)
            .expect("built-ins never fail dispatch")
    }

    /// An environment rooted at `dir`, with `HOME` pointing there too.
    pub fn env_in(dir: &Path) -> Environment {
        let dir = fs::canonicalize(dir).unwrap();
        let mut env = Environment::empty(&dir);
        env.set_var("HOME", dir.to_string_lossy().to_string());
        env.set_var("USER", "tester");
        env
    }

    pub fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use crate::env::Environment;

    #[test]
    fn help_flag_prints_usage_and_succeeds() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "echo", &["--help"]);
        assert_eq!(out.status, 0);
        assert!(out.stdout.starts_with("Usage: echo"));
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "pwd", &["--bogus"]);
        assert_eq!(out.status, 1);
        assert!(out.stdout.is_empty());
        assert!(out.stderr.contains("--bogus"));
    }

    #[test]
    fn bare_help_word_is_an_operand() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "echo", &["help", "me"]);
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout, "help me\n");
    }
}
