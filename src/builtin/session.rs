//! Built-ins that read or change session state: directory, variables,
//! aliases, history.

use super::{BuiltinCommand, io_reason, report};
use crate::command::{Context, ExitCode};
use crate::lexer;
use anyhow::{Context as _, Result, anyhow, bail};
use argh::FromArgs;
use chrono::format::{Item, StrftimeItems};
use chrono::{Local, Utc};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn summary() -> &'static str {
        "Print working directory"
    }

    fn usage() -> &'static str {
        "pwd"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        writeln!(ctx.stdout, "{}", ctx.env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative to the current directory, `~` or `-`.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "Change directory"
    }

    fn usage() -> &'static str {
        "cd [dir]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let env = &mut *ctx.env;
        let (shown, target) = match self.target.as_deref() {
            None | Some("") => match env.home_dir() {
                Some(home) => (home.to_string_lossy().into_owned(), home),
                None => bail!("HOME not set"),
            },
            Some("-") => match env.get_var("OLDPWD") {
                Some(old) if !old.is_empty() => (old.to_string(), PathBuf::from(old)),
                _ => bail!("OLDPWD not set"),
            },
            Some(t) => (t.to_string(), env.resolve_path(t)),
        };

        let canonical = fs::canonicalize(&target).map_err(|e| anyhow!("{}: {}", shown, io_reason(&e)))?;
        if !canonical.is_dir() {
            bail!("{}: Not a directory", shown);
        }

        let previous = std::mem::replace(&mut env.current_dir, canonical);
        env.set_var("OLDPWD", previous.to_string_lossy().into_owned());
        env.set_var("PWD", env.current_dir.to_string_lossy().into_owned());
        info!(from = %previous.display(), to = %env.current_dir.display(), "changed directory");
        if self.target.as_deref() == Some("-") {
            writeln!(ctx.stdout, "{}", ctx.env.current_dir.display())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional)]
    /// exit status, 0 by default.
    pub code: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn summary() -> &'static str {
        "Exit the shell"
    }

    fn usage() -> &'static str {
        "exit [code]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let code = match self.code {
            None => 0,
            Some(code) => code
                .parse::<i64>()
                .map_err(|_| anyhow!("{}: numeric argument required", code))?
                .rem_euclid(256) as ExitCode,
        };
        ctx.env.exit_requested = Some(code);
        Ok(code)
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn summary() -> &'static str {
        "Print arguments"
    }

    fn usage() -> &'static str {
        "echo [-n] [text]..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(ctx.stdout, "{}", s)?;
        } else {
            writeln!(ctx.stdout, "{}", s)?;
        }
        Ok(0)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[derive(FromArgs)]
/// Set shell variables. Without arguments, list them.
pub struct Export {
    #[argh(positional, greedy)]
    /// assignments of the form NAME=value, or bare names.
    pub assignments: Vec<String>,
}

impl BuiltinCommand for Export {
    fn name() -> &'static str {
        "export"
    }

    fn summary() -> &'static str {
        "Set environment variable"
    }

    fn usage() -> &'static str {
        "export [NAME=value]..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.assignments.is_empty() {
            let mut vars: Vec<_> = ctx.env.vars.iter().collect();
            vars.sort();
            for (name, value) in vars {
                writeln!(ctx.stdout, "export {}={}", name, lexer::quote(value))?;
            }
            return Ok(0);
        }

        let mut status = 0;
        for assignment in &self.assignments {
            let (name, value) = match assignment.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (assignment.as_str(), None),
            };
            if !is_identifier(name) {
                report(ctx, "export", format!("`{}': not a valid identifier", assignment))?;
                status = 1;
                continue;
            }
            match value {
                Some(value) => ctx.env.set_var(name, value),
                // Every variable is already passed to child processes.
                None => {
                    if ctx.env.get_var(name).is_none() {
                        ctx.env.set_var(name, "");
                    }
                }
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Print every variable as NAME=value.
pub struct Env {}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    fn summary() -> &'static str {
        "Show environment variables"
    }

    fn usage() -> &'static str {
        "env"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let mut vars: Vec<_> = ctx.env.vars.iter().collect();
        vars.sort();
        for (name, value) in vars {
            writeln!(ctx.stdout, "{}={}", name, value)?;
        }
        Ok(0)
    }
}

/// `'value'` with embedded single quotes escaped the POSIX way.
fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[derive(FromArgs)]
/// Define or show aliases. Without arguments, list them all.
pub struct Alias {
    #[argh(positional, greedy)]
    /// definitions of the form name=value, or names to show.
    pub definitions: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn summary() -> &'static str {
        "Create command alias"
    }

    fn usage() -> &'static str {
        "alias [name=value | name]..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.definitions.is_empty() {
            for entry in ctx.env.aliases.iter() {
                writeln!(ctx.stdout, "alias {}={}", entry.name, single_quoted(&entry.source))?;
            }
            return Ok(0);
        }

        let mut status = 0;
        for definition in &self.definitions {
            match definition.split_once('=') {
                Some((name, value)) => {
                    if name.is_empty() || name.contains(['/', ' ', '\t', '$', '\'', '"']) {
                        report(ctx, "alias", format!("`{}': invalid alias name", name))?;
                        status = 1;
                        continue;
                    }
                    let replacement = lexer::tokenize(value, ctx.env)
                        .with_context(|| format!("invalid alias value for '{}'", name))?;
                    ctx.env.aliases.define(name, value, replacement);
                }
                None => match ctx.env.aliases.get(definition) {
                    Some(entry) => {
                        writeln!(ctx.stdout, "alias {}={}", entry.name, single_quoted(&entry.source))?;
                    }
                    None => {
                        report(ctx, "alias", format!("{}: not found", definition))?;
                        status = 1;
                    }
                },
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Remove aliases.
pub struct Unalias {
    #[argh(switch, short = 'a')]
    /// remove every alias.
    pub all: bool,

    #[argh(positional, greedy)]
    /// names of the aliases to remove.
    pub names: Vec<String>,
}

impl BuiltinCommand for Unalias {
    fn name() -> &'static str {
        "unalias"
    }

    fn summary() -> &'static str {
        "Remove command alias"
    }

    fn usage() -> &'static str {
        "unalias [-a] name..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.all {
            ctx.env.aliases.clear();
            return Ok(0);
        }
        if self.names.is_empty() {
            bail!("usage: {}", Self::usage());
        }
        let mut status = 0;
        for name in &self.names {
            if ctx.env.aliases.remove(name).is_none() {
                report(ctx, "unalias", format!("{}: not found", name))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Show how each name would be run.
pub struct Which {
    #[argh(positional, greedy)]
    /// command names to look up.
    pub names: Vec<String>,
}

impl BuiltinCommand for Which {
    fn name() -> &'static str {
        "which"
    }

    fn summary() -> &'static str {
        "Show command location"
    }

    fn usage() -> &'static str {
        "which name..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let mut status = 0;
        for name in &self.names {
            if let Some(entry) = ctx.env.aliases.get(name) {
                writeln!(ctx.stdout, "{}: aliased to '{}'", name, entry.source)?;
                continue;
            }
            if ctx.table.get(name).is_some_and(|d| d.is_builtin()) {
                writeln!(ctx.stdout, "{}: shell builtin", name)?;
                continue;
            }
            match ctx.table.external().lookup(name, ctx.env) {
                Some(path) => writeln!(ctx.stdout, "{}", path.display())?,
                None => {
                    report(ctx, "which", format!("{}: not found", name))?;
                    status = 1;
                }
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Show the lines entered in this session.
pub struct History {
    #[argh(positional)]
    /// how many recent entries to show (default 50).
    pub count: Option<usize>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn summary() -> &'static str {
        "Show command history"
    }

    fn usage() -> &'static str {
        "history [N]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let history = &ctx.env.history;
        if history.is_empty() {
            writeln!(ctx.stdout, "No commands in history.")?;
            return Ok(0);
        }
        let count = self.count.unwrap_or(50).min(history.len());
        let start = history.len() - count;
        for (i, line) in history.iter().enumerate().skip(start) {
            writeln!(ctx.stdout, "{:4}  {}", i + 1, line)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the built-in commands, or describe the named ones.
pub struct Help {
    #[argh(positional, greedy)]
    /// commands to describe.
    pub commands: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "Show this help"
    }

    fn usage() -> &'static str {
        "help [command]..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.commands.is_empty() {
            writeln!(ctx.stdout, "natsh: type commands, or say what you want in plain English.\n")?;
            writeln!(ctx.stdout, "Commands:")?;
            for descriptor in ctx.table.iter() {
                writeln!(ctx.stdout, "  {:<30} {}", descriptor.usage, descriptor.summary)?;
            }
            writeln!(ctx.stdout)?;
            writeln!(ctx.stdout, "Natural language, for example:")?;
            for example in ctx.interpreter.suggestions("") {
                writeln!(ctx.stdout, "  \"{}\"", example)?;
            }
            writeln!(ctx.stdout)?;
            writeln!(
                ctx.stdout,
                "Type 'ai help' for what the interpreter understands, or 'command --help' for options."
            )?;
            return Ok(0);
        }

        let mut status = 0;
        for name in &self.commands {
            match ctx.table.get(name) {
                Some(descriptor) => {
                    writeln!(ctx.stdout, "{}: {}", descriptor.name, descriptor.summary)?;
                    writeln!(ctx.stdout, "usage: {}", descriptor.usage)?;
                }
                None => {
                    report(ctx, "help", format!("no help topics match '{}'", name))?;
                    status = 1;
                }
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Print the date and time, optionally in a +FORMAT (strftime) layout.
pub struct Date {
    #[argh(switch, short = 'u')]
    /// print Coordinated Universal Time.
    pub utc: bool,

    #[argh(positional)]
    /// output format, e.g. +%Y-%m-%d.
    pub format: Option<String>,
}

impl BuiltinCommand for Date {
    fn name() -> &'static str {
        "date"
    }

    fn summary() -> &'static str {
        "Show current date/time"
    }

    fn usage() -> &'static str {
        "date [-u] [+FORMAT]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let format = match self.format.as_deref() {
            None => "%a %b %e %H:%M:%S %Z %Y",
            Some(f) => f
                .strip_prefix('+')
                .ok_or_else(|| anyhow!("invalid date '{}'", f))?,
        };
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            bail!("invalid format '{}'", format);
        }
        let text = if self.utc {
            Utc::now().format_with_items(items.iter()).to_string()
        } else {
            Local::now().format_with_items(items.iter()).to_string()
        };
        writeln!(ctx.stdout, "{}", text)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the current user name.
pub struct Whoami {}

impl BuiltinCommand for Whoami {
    fn name() -> &'static str {
        "whoami"
    }

    fn summary() -> &'static str {
        "Show current user"
    }

    fn usage() -> &'static str {
        "whoami"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let user = ["USER", "LOGNAME", "USERNAME"]
            .iter()
            .find_map(|var| ctx.env.get_var(var).filter(|v| !v.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("cannot find name for current user"))?;
        writeln!(ctx.stdout, "{}", user)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Explain how a sentence would be interpreted, without running it.
pub struct Ai {
    #[argh(switch, short = 's')]
    /// list example sentences containing the query instead.
    pub suggest: bool,

    #[argh(positional, greedy)]
    /// the sentence to interpret; `help` shows what is understood.
    pub query: Vec<String>,
}

impl BuiltinCommand for Ai {
    fn name() -> &'static str {
        "ai"
    }

    fn summary() -> &'static str {
        "Natural language command interface"
    }

    fn usage() -> &'static str {
        "ai [-s] <sentence>"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let query = self.query.join(" ");
        if self.suggest {
            for suggestion in ctx.interpreter.suggestions(&query) {
                writeln!(ctx.stdout, "{}", suggestion)?;
            }
            return Ok(0);
        }
        if query.is_empty() || query.eq_ignore_ascii_case("help") {
            writeln!(ctx.stdout, "{}", ctx.interpreter.capabilities())?;
            return Ok(0);
        }

        let result = ctx.interpreter.interpret(&query);
        match (&result.command, result.action) {
            (Some(command), Some(action)) => {
                writeln!(ctx.stdout, "Interpreted '{}' as: {}", query, command)?;
                writeln!(ctx.stdout, "Action: {}", action)?;
                Ok(0)
            }
            _ => {
                report(ctx, "ai", format!("could not interpret: '{}'", query))?;
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::env::Environment;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn pwd_prints_shell_dir_not_process_dir() {
        let tmp = tempdir().unwrap();
        let mut env = env_in(tmp.path());
        let out = run(&mut env, "pwd", &[]);
        assert_eq!(out.stdout, format!("{}\n", env.current_dir.display()));
    }

    #[test]
    fn cd_to_relative_and_absolute_paths() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        let mut env = env_in(tmp.path());
        let root = env.current_dir.clone();
        let process_dir = std::env::current_dir().unwrap();

        assert_eq!(run(&mut env, "cd", &["a/b"]).status, 0);
        assert_eq!(env.current_dir, root.join("a/b"));
        assert_eq!(env.get_var("OLDPWD"), Some(root.to_str().unwrap()));

        assert_eq!(run(&mut env, "cd", &[".."]).status, 0);
        assert_eq!(env.current_dir, root.join("a"));

        let target = root.join("a/b");
        assert_eq!(run(&mut env, "cd", &[target.to_str().unwrap()]).status, 0);
        assert_eq!(env.current_dir, target);

        assert_eq!(std::env::current_dir().unwrap(), process_dir);
    }

    #[test]
    fn cd_to_home_when_none() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut env = env_in(tmp.path());
        let home = env.current_dir.clone();
        env.current_dir = home.join("sub");

        assert_eq!(run(&mut env, "cd", &[]).status, 0);
        assert_eq!(env.current_dir, home);

        assert_eq!(run(&mut env, "cd", &["-"]).status, 0);
        assert_eq!(env.current_dir, home.join("sub"));
    }

    #[test]
    fn cd_failure_leaves_directory_unchanged() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("file"), "").unwrap();
        let mut env = env_in(tmp.path());
        let before = env.current_dir.clone();

        let out = run(&mut env, "cd", &["missing"]);
        assert_eq!(out.status, 1);
        assert_eq!(out.stderr, "cd: missing: No such file or directory\n");
        assert_eq!(env.current_dir, before);

        let out = run(&mut env, "cd", &["file"]);
        assert_eq!(out.status, 1);
        assert!(out.stderr.contains("Not a directory"));
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn echo_with_and_without_newline() {
        let mut env = Environment::empty("/");
        assert_eq!(run(&mut env, "echo", &["hello", "world"]).stdout, "hello world\n");
        assert_eq!(run(&mut env, "echo", &["-n", "foo", "bar"]).stdout, "foo bar");
        assert_eq!(run(&mut env, "echo", &[]).stdout, "\n");
    }

    #[test]
    fn exit_records_request_instead_of_exiting() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "exit", &["3"]);
        assert_eq!(out.status, 3);
        assert_eq!(env.exit_requested, Some(3));

        let mut env = Environment::empty("/");
        let out = run(&mut env, "exit", &["abc"]);
        assert_eq!(out.status, 1);
        assert_eq!(env.exit_requested, None);
        assert!(out.stderr.contains("numeric argument required"));
    }

    #[test]
    fn export_sets_and_lists() {
        let mut env = Environment::empty("/");
        assert_eq!(run(&mut env, "export", &["GREETING=hello world", "EMPTY="]).status, 0);
        assert_eq!(env.get_var("GREETING"), Some("hello world"));
        assert_eq!(env.get_var("EMPTY"), Some(""));

        let out = run(&mut env, "export", &[]);
        assert_eq!(out.stdout, "export EMPTY=''\nexport GREETING='hello world'\n");

        let out = run(&mut env, "export", &["1BAD=x"]);
        assert_eq!(out.status, 1);
        assert!(out.stderr.contains("not a valid identifier"));
    }

    #[test]
    fn env_lists_sorted_variables() {
        let mut env = Environment::empty("/");
        env.set_var("B", "2");
        env.set_var("A", "1");
        assert_eq!(run(&mut env, "env", &[]).stdout, "A=1\nB=2\n");
    }

    #[test]
    fn alias_define_show_list_and_remove() {
        let mut env = Environment::empty("/");
        assert_eq!(run(&mut env, "alias", &["ll=ls -la", "g=grep -i"]).status, 0);
        let entry = env.aliases.get("ll").unwrap();
        let words: Vec<_> = entry.replacement.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["ls", "-la"]);

        assert_eq!(run(&mut env, "alias", &["ll"]).stdout, "alias ll='ls -la'\n");
        assert_eq!(
            run(&mut env, "alias", &[]).stdout,
            "alias g='grep -i'\nalias ll='ls -la'\n"
        );

        let out = run(&mut env, "alias", &["nope"]);
        assert_eq!(out.status, 1);

        assert_eq!(run(&mut env, "unalias", &["ll"]).status, 0);
        assert!(!env.aliases.contains("ll"));
        assert_eq!(run(&mut env, "unalias", &["ll"]).status, 1);
        assert_eq!(run(&mut env, "unalias", &["-a"]).status, 0);
        assert!(env.aliases.is_empty());
    }

    #[test]
    fn alias_with_unbalanced_quote_is_rejected() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "alias", &["bad=echo 'oops"]);
        assert_eq!(out.status, 1);
        assert!(out.stderr.contains("invalid alias value"));
        assert!(!env.aliases.contains("bad"));
    }

    #[test]
    fn which_reports_aliases_builtins_and_missing() {
        let mut env = Environment::empty("/");
        run(&mut env, "alias", &["ll=ls -la"]);
        let out = run(&mut env, "which", &["ll", "cd", "nothing-here"]);
        assert_eq!(out.stdout, "ll: aliased to 'ls -la'\ncd: shell builtin\n");
        assert_eq!(out.stderr, "which: nothing-here: not found\n");
        assert_eq!(out.status, 1);
    }

    #[test]
    fn history_numbers_entries() {
        let mut env = Environment::empty("/");
        assert_eq!(run(&mut env, "history", &[]).stdout, "No commands in history.\n");

        env.history = vec!["pwd".into(), "ls".into(), "history 2".into()];
        let out = run(&mut env, "history", &["2"]);
        assert_eq!(out.stdout, "   2  ls\n   3  history 2\n");
    }

    #[test]
    fn help_lists_and_describes_commands() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "help", &[]);
        assert!(out.stdout.contains("cd [dir]"));
        assert!(out.stdout.contains("Show memory usage"));

        let out = run(&mut env, "help", &["cp"]);
        assert!(out.stdout.starts_with("cp: "));
        let out = run(&mut env, "help", &["nope"]);
        assert_eq!(out.status, 1);
    }

    #[test]
    fn date_accepts_strftime_formats() {
        let mut env = Environment::empty("/");
        let out = run(&mut env, "date", &["-u", "+%Y"]);
        assert_eq!(out.status, 0);
        let year: i32 = out.stdout.trim().parse().unwrap();
        assert!(year >= 2024);

        assert_eq!(run(&mut env, "date", &["%Y"]).status, 1);
        assert_eq!(run(&mut env, "date", &["+%Q"]).status, 1);
    }

    #[test]
    fn whoami_reads_user_variables() {
        let mut env = Environment::empty("/");
        assert_eq!(run(&mut env, "whoami", &[]).status, 1);
        env.set_var("LOGNAME", "ada");
        assert_eq!(run(&mut env, "whoami", &[]).stdout, "ada\n");
    }

    #[test]
    fn ai_explains_without_running() {
        let tmp = tempdir().unwrap();
        let mut env = env_in(tmp.path());
        let out = run(&mut env, "ai", &["create", "a", "new", "file", "called", "notes.txt"]);
        assert_eq!(out.status, 0);
        assert!(out.stdout.contains("as: touch notes.txt"));
        assert!(out.stdout.contains("Action: Create a new file"));
        assert!(!tmp.path().join("notes.txt").exists());

        let out = run(&mut env, "ai", &["juggle", "the", "moon"]);
        assert_eq!(out.status, 1);
        assert_eq!(out.stderr, "ai: could not interpret: 'juggle the moon'\n");

        let out = run(&mut env, "ai", &["help"]);
        assert!(out.stdout.contains("Capabilities"));

        let out = run(&mut env, "ai", &["-s", "disk"]);
        assert_eq!(out.stdout, "show disk usage\n");
    }
}
