use crate::alias::AliasTable;
use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable state of one shell session.
///
/// The environment contains:
/// - `vars`: variables used for `$NAME` expansion and passed to external commands.
/// - `current_dir`: the absolute working directory every relative path resolves against.
/// - `aliases`: the alias table consulted before dispatch.
/// - `history`: every non-blank line the engine received, in order.
/// - `exit_requested`: set by `exit`; the interactive loop stops when it is `Some`.
///
/// The store is owned by the [`Engine`](crate::Engine) and only handed out as
/// `&mut` to the single command currently running, so command N's changes are
/// always visible to command N+1.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub aliases: AliasTable,
    pub history: Vec<String>,
    pub exit_requested: Option<ExitCode>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir()
            .and_then(|dir| dir.canonicalize())
            .unwrap_or_else(|_| PathBuf::from("/"));
        let mut env = Self::empty(current_dir);
        env.vars.extend(stdenv::vars());
        env
    }

    /// An environment with no variables, rooted at `current_dir`.
    pub fn empty(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            aliases: AliasTable::default(),
            history: Vec::new(),
            exit_requested: None,
        }
    }

    /// Get the value of a variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }

    /// Resolve `path` against the working directory. `~` and `~/...` expand to `$HOME`.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if let Ok(rest) = path.strip_prefix("~") {
            if let Some(home) = self.home_dir() {
                if rest.as_os_str().is_empty() {
                    return home;
                }
                return home.join(rest);
            }
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }

    /// The working directory with `$HOME` shortened to `~`, for prompts.
    pub fn display_dir(&self) -> String {
        if let Some(home) = self.home_dir() {
            if let Ok(rest) = self.current_dir.strip_prefix(&home) {
                if rest.as_os_str().is_empty() {
                    return "~".to_string();
                }
                return format!("~/{}", rest.display());
            }
        }
        self.current_dir.display().to_string()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::path::PathBuf;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::empty("/tmp");

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE"));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(env.current_dir.is_absolute());
    }

    #[test]
    fn resolve_path_handles_relative_absolute_and_home() {
        let mut env = Environment::empty("/work");
        env.set_var("HOME", "/home/u");

        assert_eq!(env.resolve_path("a/b"), PathBuf::from("/work/a/b"));
        assert_eq!(env.resolve_path("/etc"), PathBuf::from("/etc"));
        assert_eq!(env.resolve_path("~"), PathBuf::from("/home/u"));
        assert_eq!(env.resolve_path("~/docs"), PathBuf::from("/home/u/docs"));
    }

    #[test]
    fn display_dir_abbreviates_home() {
        let mut env = Environment::empty("/home/u/src");
        env.set_var("HOME", "/home/u");
        assert_eq!(env.display_dir(), "~/src");

        env.current_dir = PathBuf::from("/home/u");
        assert_eq!(env.display_dir(), "~");

        env.current_dir = PathBuf::from("/var");
        assert_eq!(env.display_dir(), "/var");
    }
}
