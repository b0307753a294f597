use crate::command::ExitCode;
use crate::env::Environment;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

/// Captured result of a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitCode,
}

#[derive(Debug, Error)]
pub enum DelegateError {
    /// `name` is not a recognized executable.
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Runs commands that are not built into the shell.
pub trait ExternalDelegate {
    /// Where `name` would be executed from, if anywhere.
    fn lookup(&self, name: &str, env: &Environment) -> Option<PathBuf>;

    /// Runs `name` with `args` in the environment's working directory and
    /// blocks until it exits.
    fn execute(&self, name: &str, args: &[String], env: &Environment) -> Result<ExternalOutput, DelegateError>;
}

/// Spawns real child processes, resolving names through `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessDelegate;

impl ExternalDelegate for ProcessDelegate {
    fn lookup(&self, name: &str, env: &Environment) -> Option<PathBuf> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let path = Path::new(name);
        // Relative paths with a directory part are relative to the shell's
        // working directory, not the process's.
        let anchored = if path.is_absolute() || path.components().count() < 2 {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(env.current_dir.join(path))
        };
        find_command_path(OsStr::new(search_paths), &anchored).map(Cow::into_owned)
    }

    fn execute(&self, name: &str, args: &[String], env: &Environment) -> Result<ExternalOutput, DelegateError> {
        let executable = self
            .lookup(name, env)
            .ok_or_else(|| DelegateError::NotFound(name.to_string()))?;
        debug!(command = %name, path = %executable.display(), ?args, "spawning external command");

        let output = Command::new(&executable)
            .args(args)
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => DelegateError::NotFound(name.to_string()),
                _ => DelegateError::Spawn {
                    name: name.to_string(),
                    source,
                },
            })?;

        Ok(ExternalOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: match output.status.code() {
                Some(x) => x,
                None => terminated_by_signal(output.status),
            },
        })
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it is an executable file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, None) => None,
        // Single component -> search in PATH
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        // Multiple components -> relative to the current dir
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
