//! Name → handler table and the dispatch step.

use crate::command::{CommandFactory, Context, ExecutionResult};
use crate::error::ShellError;
use crate::external::{DelegateError, ExternalDelegate, ProcessDelegate};
use crate::parser::ParsedCommand;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// What runs a command.
pub enum Handler {
    BuiltIn(Box<dyn CommandFactory>),
    /// Registered name that is still handed to the external delegate, so it
    /// shows up in `help` and classification.
    ExternalDelegate,
}

pub struct HandlerDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub handler: Handler,
}

impl HandlerDescriptor {
    pub fn is_builtin(&self) -> bool {
        matches!(self.handler, Handler::BuiltIn(_))
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("builtin", &self.is_builtin())
            .finish()
    }
}

/// Commands the shell knows by name, plus the delegate for everything else.
pub struct CommandTable {
    entries: BTreeMap<&'static str, HandlerDescriptor>,
    external: Box<dyn ExternalDelegate>,
}

impl CommandTable {
    /// An empty table that sends unknown names to `external`.
    pub fn new(external: Box<dyn ExternalDelegate>) -> Self {
        Self {
            entries: BTreeMap::new(),
            external,
        }
    }

    /// Every built-in, plus `clear` handed to real processes.
    pub fn with_builtins() -> Self {
        Self::with_builtins_and_delegate(Box::new(ProcessDelegate))
    }

    pub fn with_builtins_and_delegate(external: Box<dyn ExternalDelegate>) -> Self {
        let mut table = Self::new(external);
        crate::builtin::register_all(&mut table);
        table.register_delegate("clear", "clear", "Clear the terminal screen");
        table
    }

    pub fn register_builtin(&mut self, factory: Box<dyn CommandFactory>) {
        let descriptor = HandlerDescriptor {
            name: factory.name(),
            usage: factory.usage(),
            summary: factory.summary(),
            handler: Handler::BuiltIn(factory),
        };
        self.entries.insert(descriptor.name, descriptor);
    }

    pub fn register_delegate(&mut self, name: &'static str, usage: &'static str, summary: &'static str) {
        self.entries.insert(
            name,
            HandlerDescriptor {
                name,
                usage,
                summary,
                handler: Handler::ExternalDelegate,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&HandlerDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Descriptors sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.entries.values()
    }

    pub fn external(&self) -> &dyn ExternalDelegate {
        self.external.as_ref()
    }

    /// Runs `cmd`.
    ///
    /// Built-ins always produce a result; only a name that neither the table
    /// nor the external delegate knows is an error.
    pub fn dispatch(&self, cmd: &ParsedCommand, ctx: &mut Context<'_>) -> Result<ExecutionResult, ShellError> {
        match self.entries.get(cmd.name.as_str()).map(|d| &d.handler) {
            Some(Handler::BuiltIn(factory)) => {
                let argv = cmd.argv();
                let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
                debug!(command = %cmd.name, ?argv, "dispatching to built-in");
                let status = match factory.create(&argv).execute(ctx) {
                    Ok(status) => status,
                    Err(err) => {
                        ctx.stderr
                            .extend_from_slice(format!("{}: {:#}\n", cmd.name, err).as_bytes());
                        1
                    }
                };
                Ok(ctx.finish(status))
            }
            Some(Handler::ExternalDelegate) | None => {
                debug!(command = %cmd.name, args = ?cmd.args, "dispatching to external delegate");
                match self.external.execute(&cmd.name, &cmd.args, ctx.env) {
                    Ok(out) => Ok(ExecutionResult::completed(out.status, out.stdout, out.stderr)),
                    Err(DelegateError::NotFound(name)) => Err(ShellError::CommandNotFound { name }),
                    Err(err @ DelegateError::Spawn { .. }) => {
                        warn!(%err, "failed to start external command");
                        Ok(ExecutionResult::completed(126, "", format!("{}\n", err)))
                    }
                }
            }
        }
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::env::Environment;
    use crate::external::ExternalOutput;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Knows a fixed set of programs and records every call.
    #[derive(Default)]
    pub struct FakeDelegate {
        pub known: Vec<&'static str>,
        pub calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl FakeDelegate {
        pub fn knowing(known: &[&'static str]) -> Self {
            Self {
                known: known.to_vec(),
                calls: RefCell::default(),
            }
        }
    }

    impl ExternalDelegate for FakeDelegate {
        fn lookup(&self, name: &str, _env: &Environment) -> Option<PathBuf> {
            self.known
                .contains(&name)
                .then(|| PathBuf::from("/usr/bin").join(name))
        }

        fn execute(&self, name: &str, args: &[String], env: &Environment) -> Result<ExternalOutput, DelegateError> {
            if self.lookup(name, env).is_none() {
                return Err(DelegateError::NotFound(name.to_string()));
            }
            self.calls.borrow_mut().push((name.to_string(), args.to_vec()));
            Ok(ExternalOutput {
                stdout: format!("{} {}\n", name, args.join(" ")),
                stderr: String::new(),
                status: if name == "false" { 1 } else { 0 },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeDelegate;
    use super::*;
    use crate::env::Environment;
    use crate::monitor::fake::FakeMonitor;
    use crate::nl::NlInterpreter;

    fn run(table: &CommandTable, env: &mut Environment, name: &str, args: &[&str]) -> Result<ExecutionResult, ShellError> {
        let interpreter = NlInterpreter::new();
        let mut ctx = Context::new(env, table, &FakeMonitor, &interpreter);
        table.dispatch(&ParsedCommand::new(name, args), &mut ctx)
    }

    #[test]
    fn builtins_and_clear_are_registered() {
        let table = CommandTable::with_builtins_and_delegate(Box::new(FakeDelegate::default()));
        for name in ["cd", "pwd", "echo", "ls", "cp", "grep", "free", "alias", "exit"] {
            assert!(table.get(name).is_some_and(|d| d.is_builtin()), "{name}");
        }
        let clear = table.get("clear").unwrap();
        assert!(!clear.is_builtin());
        assert!(!table.contains("Echo"));
    }

    #[test]
    fn builtin_output_is_captured() {
        let table = CommandTable::with_builtins_and_delegate(Box::new(FakeDelegate::default()));
        let mut env = Environment::empty("/");
        let out = run(&table, &mut env, "echo", &["hello", "world"]).unwrap();
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout, "hello world\n");
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn builtin_argument_errors_become_status_one() {
        let table = CommandTable::with_builtins_and_delegate(Box::new(FakeDelegate::default()));
        let mut env = Environment::empty("/");
        let out = run(&table, &mut env, "head", &["-n", "many", "f"]).unwrap();
        assert_eq!(out.status, 1);
        assert!(!out.stderr.is_empty());

        let out = run(&table, &mut env, "head", &["--help"]).unwrap();
        assert_eq!(out.status, 0);
        assert!(out.stdout.contains("Usage"));
    }

    #[test]
    fn unknown_names_go_to_the_delegate() {
        let delegate = FakeDelegate::knowing(&["git", "clear"]);
        let table = CommandTable::with_builtins_and_delegate(Box::new(delegate));
        let mut env = Environment::empty("/");

        let out = run(&table, &mut env, "git", &["status", "-s"]).unwrap();
        assert_eq!(out.stdout, "git status -s\n");

        let out = run(&table, &mut env, "clear", &[]).unwrap();
        assert_eq!(out.status, 0);
    }

    #[test]
    fn missing_command_is_an_error_naming_it() {
        let table = CommandTable::with_builtins_and_delegate(Box::new(FakeDelegate::default()));
        let mut env = Environment::empty("/");
        assert_eq!(
            run(&table, &mut env, "frobnicate", &[]).unwrap_err(),
            ShellError::CommandNotFound {
                name: "frobnicate".into()
            }
        );
    }
}
