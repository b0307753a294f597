use anyhow::bail;
use natsh::monitor::{CpuInfo, DiskInfo, MemoryInfo, ProcessInfo};
use natsh::{
    CommandTable, DelegateError, Engine, Environment, ExternalDelegate, ExternalOutput, Outcome, ShellError,
    SystemMonitor,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

/// Knows no programs at all.
struct NoPrograms;

impl ExternalDelegate for NoPrograms {
    fn lookup(&self, _name: &str, _env: &Environment) -> Option<PathBuf> {
        None
    }

    fn execute(&self, name: &str, _args: &[String], _env: &Environment) -> Result<ExternalOutput, DelegateError> {
        Err(DelegateError::NotFound(name.to_string()))
    }
}

struct NoSystem;

impl SystemMonitor for NoSystem {
    fn memory(&self) -> anyhow::Result<MemoryInfo> {
        bail!("no memory information in tests")
    }

    fn disks(&self) -> anyhow::Result<Vec<DiskInfo>> {
        bail!("no disk information in tests")
    }

    fn cpu(&self) -> anyhow::Result<CpuInfo> {
        bail!("no cpu information in tests")
    }

    fn processes(&self) -> anyhow::Result<Vec<ProcessInfo>> {
        Ok(Vec::new())
    }

    fn uptime(&self) -> anyhow::Result<Duration> {
        Ok(Duration::from_secs(60))
    }
}

fn shell() -> (TempDir, Engine) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    let mut env = Environment::empty(&root);
    env.set_var("HOME", root.to_str().unwrap());
    env.set_var("USER", "tester");
    let table = CommandTable::with_builtins_and_delegate(Box::new(NoPrograms));
    (tmp, Engine::with_parts(env, table, Box::new(NoSystem)))
}

fn root(sh: &Engine) -> &Path {
    Path::new(sh.env().get_var("HOME").unwrap())
}

#[test]
fn cd_then_pwd_sees_the_new_directory() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    fs::create_dir(home.join("src")).unwrap();

    assert_eq!(sh.run_line("cd src").status, 0);
    assert_eq!(sh.run_line("pwd").stdout, format!("{}\n", home.join("src").display()));

    let failed = sh.run_line("cd nowhere");
    assert_ne!(failed.status, 0);
    assert!(failed.stderr.contains("nowhere"));
    assert_eq!(sh.env().current_dir, home.join("src"));
}

#[test]
fn natural_language_reuses_the_literal_commands() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    let actions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&actions);
    sh.on_interpret(move |i| sink.borrow_mut().push(i.command.clone().unwrap_or_default()));

    let result = sh.run_line("create a new file called example.txt");
    assert_eq!(result.status, 0);
    assert!(home.join("example.txt").is_file());
    assert_eq!(result.interpretation.unwrap().rule, Some("create-file"));

    assert!(sh.run_line("make a folder named backup").success());
    assert!(sh.run_line("copy example.txt to backup folder").success());
    assert!(home.join("backup/example.txt").is_file());

    let found = sh.run_line("search for files named example");
    assert_eq!(found.stdout, "./backup/example.txt\n./example.txt\n");

    let here = sh.run_line("where am I?");
    assert_eq!(here.stdout, format!("{}\n", home.display()));

    assert_eq!(
        *actions.borrow(),
        vec![
            "touch example.txt",
            "mkdir backup",
            "cp example.txt backup",
            "find . '*example*'",
            "pwd",
        ]
    );
}

#[test]
fn quoted_names_survive_interpretation() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    sh.env_mut().set_var("X", "expanded");

    assert!(sh.run_line("create a file called \"my $X notes.txt\"").success());
    assert!(home.join("my $X notes.txt").is_file());
}

#[test]
fn removing_dot_entries_is_refused() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    fs::create_dir_all(home.join("a/b")).unwrap();
    fs::write(home.join("a/b/keep.txt"), "x").unwrap();
    assert!(sh.run_line("cd a/b").success());

    let typed = sh.run_line("rm -r .");
    assert_eq!(typed.status, 1);
    assert!(home.join("a/b/keep.txt").exists());

    let spoken = sh.run_line("delete the folder ..");
    assert_eq!(spoken.interpretation.unwrap().command.as_deref(), Some("rm -r .."));
    assert_eq!(spoken.status, 1);
    assert_eq!(spoken.stderr, "rm: refusing to remove '.' or '..' directory: skipping '..'\n");
    assert!(home.join("a/b/keep.txt").exists());
}

#[test]
fn copying_a_file_onto_itself_fails() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    fs::write(home.join("notes.txt"), "important data\n").unwrap();

    let result = sh.run_line("copy notes.txt to notes.txt");
    assert_eq!(result.status, 1);
    assert_eq!(result.stderr, "cp: 'notes.txt' and 'notes.txt' are the same file\n");
    assert_eq!(sh.run_line("cp notes.txt .").status, 1);
    assert_eq!(fs::read_to_string(home.join("notes.txt")).unwrap(), "important data\n");
}

#[test]
fn dash_names_stay_operands() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    fs::write(home.join("-old.txt"), "x").unwrap();

    let removed = sh.run_line("delete the file -old.txt");
    assert_eq!(removed.status, 0, "{}", removed.stderr);
    assert!(!home.join("-old.txt").exists());

    assert!(sh.run_line("create a file called -v").success());
    assert!(home.join("-v").is_file());

    assert_eq!(sh.run_line("echo '-n' hi").stdout, "-n hi\n");
}

#[test]
fn filler_words_are_not_understood() {
    let (_tmp, mut sh) = shell();
    let home = root(&sh).to_path_buf();
    fs::create_dir(home.join("the")).unwrap();

    let result = sh.run_line("delete the folder");
    assert_eq!(result.outcome, Outcome::NotUnderstood);
    assert!(home.join("the").is_dir());

    let back = sh.run_line("move back to the parent directory");
    assert_eq!(back.interpretation.unwrap().command.as_deref(), Some("cd .."));
}

#[test]
fn unknown_sentence_is_not_understood() {
    let (_tmp, mut sh) = shell();
    let result = sh.run_line("do something unknowable");
    assert_eq!(result.outcome, Outcome::NotUnderstood);
    assert_eq!(result.status, 1);
    assert_eq!(result.stderr, "could not interpret: 'do something unknowable'\n");
}

#[test]
fn unknown_command_is_not_found() {
    let (_tmp, mut sh) = shell();
    let result = sh.run_line("frobnicate");
    assert_eq!(
        result.outcome,
        Outcome::Failed(ShellError::CommandNotFound {
            name: "frobnicate".into()
        })
    );
    assert_eq!(result.status, 127);
    assert_eq!(result.stderr, "command not found: frobnicate\n");
}

#[test]
fn exports_expand_in_later_lines() {
    let (_tmp, mut sh) = shell();
    assert!(sh.run_line("export GREETING=\"hello world\"").success());
    assert_eq!(sh.run_line("echo \"$GREETING\"!").stdout, "hello world!\n");
    assert_eq!(sh.run_line("echo '$GREETING'").stdout, "$GREETING\n");
    assert_eq!(sh.run_line("echo ${GREETING}").stdout, "hello world\n");
}

#[test]
fn aliases_expand_and_cycles_are_reported() {
    let (_tmp, mut sh) = shell();
    assert!(sh.run_line("alias greet='echo hi'").success());
    assert_eq!(sh.run_line("greet there").stdout, "hi there\n");

    assert!(sh.run_line("alias ls=ls").success());
    let result = sh.run_line("ls");
    assert_eq!(result.outcome, Outcome::Failed(ShellError::AliasCycle { name: "ls".into() }));
    assert_eq!(result.status, 1);
}

#[test]
fn syntax_errors_do_not_stop_the_engine() {
    let (_tmp, mut sh) = shell();
    let result = sh.run_line("echo \"unterminated");
    assert!(matches!(result.outcome, Outcome::Failed(ShellError::Syntax { .. })));
    assert_eq!(result.status, 2);
    assert_eq!(sh.run_line("echo fine").stdout, "fine\n");
}

#[test]
fn exit_only_records_the_request() {
    let (_tmp, mut sh) = shell();
    assert_eq!(sh.run_line("exit 3").status, 3);
    assert_eq!(sh.exit_requested(), Some(3));
    assert_eq!(sh.run_line("echo after").stdout, "after\n");
}

#[test]
fn history_records_every_non_blank_line() {
    let (_tmp, mut sh) = shell();
    sh.run_line("echo one");
    sh.run_line("");
    sh.run_line("where am I");
    let out = sh.run_line("history");
    assert_eq!(out.stdout, "   1  echo one\n   2  where am I\n   3  history\n");
}

#[test]
fn monitor_failures_are_command_failures() {
    let (_tmp, mut sh) = shell();
    let result = sh.run_line("show memory usage");
    assert_eq!(result.status, 1);
    assert_eq!(result.outcome, Outcome::Completed);
    assert!(result.stderr.starts_with("free: no memory information"));
}
