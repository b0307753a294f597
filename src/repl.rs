//! The interactive loop around an [`Engine`].

use crate::command::{ExecutionResult, ExitCode};
use crate::engine::Engine;
use crate::env::Environment;
use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Commands whose later words complete as paths.
const FILE_COMMANDS: &[&str] = &[
    "ls", "cd", "cat", "cp", "mv", "rm", "rmdir", "mkdir", "find", "grep", "head", "tail", "touch", "wc",
];

/// Tab completion: command and alias names for the first word, entries of
/// the session directory after file commands.
#[derive(Debug, Default)]
pub struct ShellHelper {
    commands: Vec<String>,
    current_dir: PathBuf,
    home: Option<PathBuf>,
}

impl ShellHelper {
    /// Picks up the engine's commands, aliases and working directory.
    pub fn refresh(&mut self, engine: &Engine) {
        let env = engine.env();
        self.commands = engine
            .table()
            .iter()
            .map(|descriptor| descriptor.name.to_string())
            .chain(env.aliases.iter().map(|alias| alias.name.clone()))
            .collect();
        self.commands.sort();
        self.commands.dedup();
        self.current_dir = env.current_dir.clone();
        self.home = env.home_dir();
    }

    /// Where the word ending at `pos` starts, and its completions.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let before = &line[..pos];
        let start = before.rfind([' ', '\t']).map_or(0, |i| i + 1);
        let word = &before[start..];

        if before[..start].trim().is_empty() {
            let names = self
                .commands
                .iter()
                .filter(|name| name.starts_with(word))
                .map(|name| Pair {
                    display: name.clone(),
                    replacement: name.clone(),
                })
                .collect();
            return (start, names);
        }

        match before.split_whitespace().next() {
            Some(command) if FILE_COMMANDS.contains(&command) => (start, self.paths(word)),
            _ => (start, Vec::new()),
        }
    }

    fn paths(&self, word: &str) -> Vec<Pair> {
        let (dir_part, name_part) = match word.rfind('/') {
            Some(i) => word.split_at(i + 1),
            None => ("", word),
        };
        let Ok(entries) = fs::read_dir(self.resolve(dir_part)) else {
            return Vec::new();
        };

        let mut pairs: Vec<Pair> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !name.starts_with(name_part) || (name.starts_with('.') && !name_part.starts_with('.')) {
                    return None;
                }
                let slash = if entry.path().is_dir() { "/" } else { "" };
                Some(Pair {
                    display: format!("{}{}", name, slash),
                    replacement: format!("{}{}{}", dir_part, name, slash),
                })
            })
            .collect();
        pairs.sort_by(|a, b| a.display.cmp(&b.display));
        pairs
    }

    fn resolve(&self, dir_part: &str) -> PathBuf {
        if dir_part.is_empty() {
            return self.current_dir.clone();
        }
        if let (Some(rest), Some(home)) = (dir_part.strip_prefix("~/"), &self.home) {
            return home.join(rest);
        }
        let path = Path::new(dir_part);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Reads lines until `exit` or end of input and returns the session's exit code.
///
/// History is loaded from and saved back to `history_file` when given.
/// Ctrl-C abandons the line being edited.
pub fn run(engine: &mut Engine, history_file: Option<&Path>) -> Result<ExitCode> {
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new().context("failed to create line editor")?;
    rl.set_helper(Some(ShellHelper::default()));
    if let Some(path) = history_file {
        if let Err(err) = rl.load_history(path) {
            debug!(path = %path.display(), %err, "no history loaded");
        }
    }

    let color = io::stderr().is_terminal();
    engine.on_interpret(move |interpretation| {
        if let (Some(action), Some(command)) = (interpretation.action, &interpretation.command) {
            let notice = format!("[{}] {}", action, command);
            if color {
                eprintln!("{}", notice.cyan());
            } else {
                eprintln!("{}", notice);
            }
        }
    });

    let mut status = 0;
    loop {
        if let Some(helper) = rl.helper_mut() {
            helper.refresh(engine);
        }
        match rl.readline(&prompt(engine.env())) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                let result = engine.run_line(&line);
                print_result(&result, color)?;
                status = result.status;
                if let Some(code) = engine.exit_requested() {
                    status = code;
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }

    if let Some(path) = history_file {
        if let Err(err) = rl.save_history(path) {
            warn!(path = %path.display(), %err, "could not save history");
        }
    }
    Ok(status)
}

/// Writes a result's output to the process streams; stderr in red when
/// `color` is set.
pub fn print_result(result: &ExecutionResult, color: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(result.stdout.as_bytes())?;
    stdout.flush()?;

    if !result.stderr.is_empty() {
        let mut stderr = io::stderr().lock();
        if color {
            write!(stderr, "{}", result.stderr.red())?;
        } else {
            stderr.write_all(result.stderr.as_bytes())?;
        }
    }
    Ok(())
}

/// `user@host:~/dir$ `
pub fn prompt(env: &Environment) -> String {
    let user = env
        .get_var("USER")
        .or_else(|| env.get_var("LOGNAME"))
        .unwrap_or("user");
    format!("{}@{}:{}$ ", user, hostname(env), env.display_dir())
}

fn hostname(env: &Environment) -> String {
    if let Some(host) = env.get_var("HOSTNAME").filter(|h| !h.is_empty()) {
        return host.to_string();
    }
    system_hostname().unwrap_or_else(|| "localhost".to_string())
}

#[cfg(target_os = "linux")]
fn system_hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()?
        .into_string()
        .ok()
        .filter(|host| !host.is_empty())
}

#[cfg(not(target_os = "linux"))]
fn system_hostname() -> Option<String> {
    None
}
