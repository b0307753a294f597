//! File and directory built-ins.
//!
//! Operands are taken as typed for messages and resolved against the session
//! working directory for access. Commands with several operands keep going
//! after a failure, report it and exit non-zero.

use super::{BuiltinCommand, io_reason, report};
use crate::command::{Context, ExitCode};
use crate::monitor::format_bytes;
use anyhow::{Context as _, Result, bail};
use argh::FromArgs;
use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};
use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

#[derive(FromArgs)]
/// List directory contents.
pub struct Ls {
    #[argh(switch, short = 'a')]
    /// include entries starting with a dot.
    pub all: bool,

    #[argh(switch, short = 'l')]
    /// use a long listing format.
    pub long: bool,

    #[argh(switch, short = 'h')]
    /// with -l, print sizes like 1K 234M 2G.
    pub human: bool,

    #[argh(positional)]
    /// files or directories to list; the current directory by default.
    pub paths: Vec<String>,
}

struct Listed {
    name: String,
    path: PathBuf,
}

impl Ls {
    fn entries(&self, dir: &Path) -> io::Result<Vec<Listed>> {
        let mut entries = Vec::new();
        if self.all {
            for name in [".", ".."] {
                entries.push(Listed {
                    name: name.to_string(),
                    path: dir.join(name),
                });
            }
        }
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.all && name.starts_with('.') {
                continue;
            }
            entries.push(Listed {
                name,
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn print(&self, out: &mut Vec<u8>, listed: &[Listed], with_total: bool) -> io::Result<()> {
        if !self.long {
            for item in listed {
                writeln!(out, "{}", item.name)?;
            }
            return Ok(());
        }

        let mut total_blocks = 0;
        let mut rows = Vec::with_capacity(listed.len());
        for item in listed {
            let meta = fs::symlink_metadata(&item.path)?;
            total_blocks += blocks(&meta);
            rows.push(self.long_row(item, &meta));
        }
        if with_total {
            writeln!(out, "total {}", total_blocks)?;
        }
        for row in rows {
            writeln!(out, "{}", row)?;
        }
        Ok(())
    }

    fn long_row(&self, item: &Listed, meta: &Metadata) -> String {
        let size = if self.human {
            format_bytes(meta.len())
        } else {
            meta.len().to_string()
        };
        let modified = meta
            .modified()
            .map(|t| DateTime::<Local>::from(t).format("%b %e %H:%M").to_string())
            .unwrap_or_else(|_| "?".to_string());
        let (mode, links, owner, group) = ownership(meta);
        let mut row = format!(
            "{} {:>3} {:<8} {:<8} {:>8} {} {}",
            mode, links, owner, group, size, modified, item.name
        );
        if meta.file_type().is_symlink() {
            if let Ok(target) = fs::read_link(&item.path) {
                row.push_str(&format!(" -> {}", target.display()));
            }
        }
        row
    }
}

#[cfg(unix)]
fn ownership(meta: &Metadata) -> (String, u64, String, String) {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};
    let kind = if meta.file_type().is_symlink() {
        'l'
    } else if meta.is_dir() {
        'd'
    } else {
        '-'
    };
    let mode = meta.permissions().mode();
    let mut text = String::with_capacity(10);
    text.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        text.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        text.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        text.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    let (owner, group) = owner_names(meta.uid(), meta.gid());
    (text, meta.nlink(), owner, group)
}

#[cfg(target_os = "linux")]
fn owner_names(uid: u32, gid: u32) -> (String, String) {
    use nix::unistd::{Gid, Group, Uid, User};
    let owner = User::from_uid(Uid::from_raw(uid))
        .ok()
        .flatten()
        .map_or_else(|| uid.to_string(), |user| user.name);
    let group = Group::from_gid(Gid::from_raw(gid))
        .ok()
        .flatten()
        .map_or_else(|| gid.to_string(), |group| group.name);
    (owner, group)
}

#[cfg(all(unix, not(target_os = "linux")))]
fn owner_names(uid: u32, gid: u32) -> (String, String) {
    (uid.to_string(), gid.to_string())
}

#[cfg(not(unix))]
fn ownership(meta: &Metadata) -> (String, u64, String, String) {
    let kind = if meta.is_dir() { "d" } else { "-" };
    let write = if meta.permissions().readonly() { "r-" } else { "rw" };
    (format!("{}{}-------", kind, write), 1, "-".into(), "-".into())
}

#[cfg(unix)]
fn blocks(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    // st_blocks counts 512-byte units; ls reports 1K blocks.
    meta.blocks() / 2
}

#[cfg(not(unix))]
fn blocks(meta: &Metadata) -> u64 {
    meta.len().div_ceil(1024)
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn summary() -> &'static str {
        "List directory contents"
    }

    fn usage() -> &'static str {
        "ls [-a] [-l] [-h] [path]..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let operands = if self.paths.is_empty() {
            vec![".".to_string()]
        } else {
            self.paths.clone()
        };

        let mut status = 0;
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for operand in &operands {
            let path = ctx.env.resolve_path(operand);
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => dirs.push((operand, path)),
                Ok(_) => files.push(Listed {
                    name: operand.clone(),
                    path,
                }),
                Err(e) => {
                    report(ctx, "ls", format!("cannot access '{}': {}", operand, io_reason(&e)))?;
                    status = 2;
                }
            }
        }

        self.print(&mut ctx.stdout, &files, false)?;
        let show_headers = operands.len() > 1;
        for (i, (operand, path)) in dirs.iter().enumerate() {
            if show_headers {
                if i > 0 || !files.is_empty() {
                    writeln!(ctx.stdout)?;
                }
                writeln!(ctx.stdout, "{}:", operand)?;
            }
            match self.entries(path) {
                Ok(entries) => self.print(&mut ctx.stdout, &entries, true)?,
                Err(e) => {
                    report(ctx, "ls", format!("cannot open directory '{}': {}", operand, io_reason(&e)))?;
                    status = 2;
                }
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Create directories.
pub struct Mkdir {
    #[argh(switch, short = 'p')]
    /// create missing parents and ignore existing directories.
    pub parents: bool,

    #[argh(positional)]
    /// directories to create.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn summary() -> &'static str {
        "Create directory"
    }

    fn usage() -> &'static str {
        "mkdir [-p] <dir>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.dirs.is_empty() {
            bail!("missing operand");
        }
        let mut status = 0;
        for dir in &self.dirs {
            let path = ctx.env.resolve_path(dir);
            let created = if self.parents {
                fs::create_dir_all(&path)
            } else {
                fs::create_dir(&path)
            };
            if let Err(e) = created {
                report(ctx, "mkdir", format!("cannot create directory '{}': {}", dir, io_reason(&e)))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Remove empty directories.
pub struct Rmdir {
    #[argh(positional)]
    /// directories to remove.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Rmdir {
    fn name() -> &'static str {
        "rmdir"
    }

    fn summary() -> &'static str {
        "Remove empty directory"
    }

    fn usage() -> &'static str {
        "rmdir <dir>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.dirs.is_empty() {
            bail!("missing operand");
        }
        let mut status = 0;
        for dir in &self.dirs {
            if let Err(e) = fs::remove_dir(ctx.env.resolve_path(dir)) {
                report(ctx, "rmdir", format!("failed to remove '{}': {}", dir, io_reason(&e)))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Remove files or directories.
pub struct Rm {
    #[argh(switch, short = 'r')]
    /// remove directories and their contents recursively.
    pub recursive: bool,

    #[argh(switch, short = 'f')]
    /// ignore nonexistent files, never fail on them.
    pub force: bool,

    #[argh(positional)]
    /// paths to remove.
    pub paths: Vec<String>,
}

/// Why `rm` must leave `operand` alone, if it must.
fn refuse_removal(operand: &str) -> Option<String> {
    let trimmed = operand.trim_end_matches('/');
    if trimmed.is_empty() {
        return Some(format!("it is dangerous to operate recursively on '{}'", operand));
    }
    match trimmed.rsplit('/').next() {
        Some("." | "..") => Some(format!(
            "refusing to remove '.' or '..' directory: skipping '{}'",
            operand
        )),
        _ => None,
    }
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "rm"
    }

    fn summary() -> &'static str {
        "Remove file/directory"
    }

    fn usage() -> &'static str {
        "rm [-r] [-f] <path>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.paths.is_empty() && !self.force {
            bail!("missing operand");
        }
        let mut status = 0;
        for operand in &self.paths {
            if let Some(reason) = refuse_removal(operand) {
                report(ctx, "rm", reason)?;
                status = 1;
                continue;
            }
            let path = ctx.env.resolve_path(operand);
            let removed = match fs::symlink_metadata(&path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound && self.force => continue,
                Err(e) => Err(e),
                Ok(meta) if meta.is_dir() => {
                    if !self.recursive {
                        report(ctx, "rm", format!("cannot remove '{}': Is a directory", operand))?;
                        status = 1;
                        continue;
                    }
                    fs::remove_dir_all(&path)
                }
                Ok(_) => fs::remove_file(&path),
            };
            if let Err(e) = removed {
                report(ctx, "rm", format!("cannot remove '{}': {}", operand, io_reason(&e)))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

/// Where a source lands: inside `dst` when it is a directory, else `dst` itself.
fn destination_for(src: &Path, dst: &Path) -> PathBuf {
    match (dst.is_dir(), src.file_name()) {
        (true, Some(name)) => dst.join(name),
        _ => dst.to_path_buf(),
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| anyhow::anyhow!("{}", io_reason(&e)))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| anyhow::anyhow!("{}", io_reason(&e)))?;
        }
    }
    Ok(())
}

/// Whether both paths name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// How `target` is shown in messages: `dst` itself, or `dst/name` when the
/// source lands inside it.
fn shown_target(dst: &str, dst_path: &Path, src_path: &Path) -> String {
    match (dst_path.is_dir(), src_path.file_name()) {
        (true, Some(name)) => format!("{}/{}", dst.trim_end_matches('/'), name.to_string_lossy()),
        _ => dst.to_string(),
    }
}

/// Splits `src... dst`, insisting on a directory destination for several sources.
fn sources_and_destination<'a>(
    ctx: &Context<'_>,
    operands: &'a [String],
) -> Result<(&'a [String], &'a String, PathBuf)> {
    let Some((dst, srcs)) = operands.split_last() else {
        bail!("missing file operand");
    };
    if srcs.is_empty() {
        bail!("missing destination file operand after '{}'", dst);
    }
    let dst_path = ctx.env.resolve_path(dst);
    if srcs.len() > 1 && !dst_path.is_dir() {
        bail!("target '{}' is not a directory", dst);
    }
    Ok((srcs, dst, dst_path))
}

#[derive(FromArgs)]
/// Copy files, or directories with -r. The last operand is the destination.
pub struct Cp {
    #[argh(switch, short = 'r')]
    /// copy directories recursively.
    pub recursive: bool,

    #[argh(positional)]
    /// sources followed by the destination.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Cp {
    fn name() -> &'static str {
        "cp"
    }

    fn summary() -> &'static str {
        "Copy file/directory"
    }

    fn usage() -> &'static str {
        "cp [-r] <src>... <dst>"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let (srcs, dst_operand, dst) = sources_and_destination(ctx, &self.operands)?;
        let mut status = 0;
        for src in srcs {
            let src_path = ctx.env.resolve_path(src);
            let target = destination_for(&src_path, &dst);
            let copied = match fs::metadata(&src_path) {
                Ok(meta) if !meta.is_dir() && same_file(&src_path, &target) => Err(anyhow::anyhow!(
                    "'{}' and '{}' are the same file",
                    src,
                    shown_target(dst_operand, &dst, &src_path)
                )),
                Err(e) => Err(anyhow::anyhow!("cannot stat '{}': {}", src, io_reason(&e))),
                Ok(meta) if meta.is_dir() => {
                    if !self.recursive {
                        Err(anyhow::anyhow!("-r not specified; omitting directory '{}'", src))
                    } else if target.starts_with(&src_path) {
                        Err(anyhow::anyhow!("cannot copy a directory, '{}', into itself", src))
                    } else {
                        copy_tree(&src_path, &target).with_context(|| format!("cannot copy '{}'", src))
                    }
                }
                Ok(_) => fs::copy(&src_path, &target)
                    .map(|_| ())
                    .map_err(|e| anyhow::anyhow!("cannot copy '{}': {}", src, io_reason(&e))),
            };
            if let Err(e) = copied {
                report(ctx, "cp", format!("{:#}", e))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Move or rename files and directories. The last operand is the destination.
pub struct Mv {
    #[argh(positional)]
    /// sources followed by the destination.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Mv {
    fn name() -> &'static str {
        "mv"
    }

    fn summary() -> &'static str {
        "Move/rename file/directory"
    }

    fn usage() -> &'static str {
        "mv <src>... <dst>"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let (srcs, _, dst) = sources_and_destination(ctx, &self.operands)?;
        let mut status = 0;
        for src in srcs {
            let src_path = ctx.env.resolve_path(src);
            let target = destination_for(&src_path, &dst);
            if let Err(e) = fs::rename(&src_path, &target) {
                report(ctx, "mv", format!("cannot move '{}': {}", src, io_reason(&e)))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Create empty files, or update the modification time of existing ones.
pub struct Touch {
    #[argh(positional)]
    /// files to touch.
    pub files: Vec<String>,
}

impl BuiltinCommand for Touch {
    fn name() -> &'static str {
        "touch"
    }

    fn summary() -> &'static str {
        "Create empty file or update timestamp"
    }

    fn usage() -> &'static str {
        "touch <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.files.is_empty() {
            bail!("missing file operand");
        }
        let mut status = 0;
        for name in &self.files {
            let touched = File::options()
                .create(true)
                .append(true)
                .open(ctx.env.resolve_path(name))
                .and_then(|file| file.set_modified(SystemTime::now()));
            if let Err(e) = touched {
                report(ctx, "touch", format!("cannot touch '{}': {}", name, io_reason(&e)))?;
                status = 1;
            }
        }
        Ok(status)
    }
}

/// Reads every operand, reporting failures under `command` and handing
/// successes to `each`.
fn for_each_file(
    ctx: &mut Context<'_>,
    command: &str,
    files: &[String],
    mut each: impl FnMut(&mut Context<'_>, &str, Vec<u8>) -> io::Result<()>,
) -> Result<ExitCode> {
    if files.is_empty() {
        bail!("missing file operand");
    }
    let mut status = 0;
    for name in files {
        match fs::read(ctx.env.resolve_path(name)) {
            Ok(content) => each(ctx, name, content)?,
            Err(e) => {
                report(ctx, command, format!("{}: {}", name, io_reason(&e)))?;
                status = 1;
            }
        }
    }
    Ok(status)
}

#[derive(argh::FromArgs)]
/// print file(s) to stdout
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to print, in order.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn summary() -> &'static str {
        "Display file contents"
    }

    fn usage() -> &'static str {
        "cat <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        for_each_file(ctx, "cat", &self.files, |ctx, _, content| {
            ctx.stdout.extend_from_slice(&content);
            Ok(())
        })
    }
}

/// Lines of `content`, each keeping its terminator.
fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

fn write_lines(out: &mut Vec<u8>, lines: &[&str]) -> io::Result<()> {
    for line in lines {
        out.write_all(line.as_bytes())?;
    }
    if lines.last().is_some_and(|l| !l.ends_with('\n')) {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Shared by `head` and `tail`: headers for several files, `pick` selects lines.
fn print_slices(
    ctx: &mut Context<'_>,
    command: &str,
    files: &[String],
    pick: impl Fn(&[&str]) -> (usize, usize),
) -> Result<ExitCode> {
    let headers = files.len() > 1;
    let mut first = true;
    for_each_file(ctx, command, files, |ctx, name, content| {
        if headers {
            if !first {
                writeln!(ctx.stdout)?;
            }
            writeln!(ctx.stdout, "==> {} <==", name)?;
        }
        first = false;
        let text = String::from_utf8_lossy(&content);
        let lines = split_lines(&text);
        let (start, end) = pick(&lines);
        write_lines(&mut ctx.stdout, &lines[start..end])
    })
}

#[derive(FromArgs)]
/// Print the first lines of files.
pub struct Head {
    #[argh(option, short = 'n', default = "10")]
    /// number of lines to print (default 10).
    pub lines: usize,

    #[argh(positional)]
    /// files to read.
    pub files: Vec<String>,
}

impl BuiltinCommand for Head {
    fn name() -> &'static str {
        "head"
    }

    fn summary() -> &'static str {
        "Display first lines of file"
    }

    fn usage() -> &'static str {
        "head [-n N] <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let n = self.lines;
        print_slices(ctx, "head", &self.files, |lines| (0, n.min(lines.len())))
    }
}

#[derive(FromArgs)]
/// Print the last lines of files.
pub struct Tail {
    #[argh(option, short = 'n', default = "10")]
    /// number of lines to print (default 10).
    pub lines: usize,

    #[argh(positional)]
    /// files to read.
    pub files: Vec<String>,
}

impl BuiltinCommand for Tail {
    fn name() -> &'static str {
        "tail"
    }

    fn summary() -> &'static str {
        "Display last lines of file"
    }

    fn usage() -> &'static str {
        "tail [-n N] <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let n = self.lines;
        print_slices(ctx, "tail", &self.files, |lines| {
            (lines.len().saturating_sub(n), lines.len())
        })
    }
}

#[derive(FromArgs)]
/// Find files whose name matches a glob pattern, e.g. find src '*.rs'.
pub struct Find {
    #[argh(option, short = 't')]
    /// only report entries of this type: f (file) or d (directory).
    pub kind: Option<String>,

    #[argh(positional)]
    /// where to start (default .), followed by the name pattern.
    pub operands: Vec<String>,
}

impl Find {
    /// `find x` means a starting point when `x` looks like a path, a pattern otherwise.
    fn split_operands(&self) -> Result<(String, Option<String>)> {
        match self.operands.as_slice() {
            [] => Ok((".".to_string(), None)),
            [one] if one.starts_with(['.', '/', '~']) => Ok((one.clone(), None)),
            [one] => Ok((".".to_string(), Some(one.clone()))),
            [path, pattern] => Ok((path.clone(), Some(pattern.clone()))),
            _ => bail!("usage: {}", Self::usage()),
        }
    }
}

impl BuiltinCommand for Find {
    fn name() -> &'static str {
        "find"
    }

    fn summary() -> &'static str {
        "Find files/directories"
    }

    fn usage() -> &'static str {
        "find [-t f|d] [path] [pattern]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let (start, pattern) = self.split_operands()?;
        let pattern = pattern
            .map(|p| glob::Pattern::new(&p).with_context(|| format!("invalid pattern '{}'", p)))
            .transpose()?;
        let want_dirs = match self.kind.as_deref() {
            None => None,
            Some("f") => Some(false),
            Some("d") => Some(true),
            Some(other) => bail!("unknown type '{}'", other),
        };

        let root = ctx.env.resolve_path(&start);
        if let Err(e) = fs::metadata(&root) {
            report(ctx, "find", format!("'{}': {}", start, io_reason(&e)))?;
            return Ok(1);
        }

        let mut status = 0;
        let mut found = Vec::new();
        for entry in WalkDir::new(&root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report(ctx, "find", e)?;
                    status = 1;
                    continue;
                }
            };
            if want_dirs.is_some_and(|dirs| dirs != entry.file_type().is_dir()) {
                continue;
            }
            if let Some(pattern) = &pattern {
                if entry.depth() == 0 || !pattern.matches(&entry.file_name().to_string_lossy()) {
                    continue;
                }
            }
            let shown = match entry.path().strip_prefix(&root) {
                Ok(rel) if rel.as_os_str().is_empty() => start.clone(),
                Ok(rel) => format!("{}/{}", start.trim_end_matches('/'), rel.display()),
                Err(_) => entry.path().display().to_string(),
            };
            found.push(shown);
        }

        found.sort();
        for path in found {
            writeln!(ctx.stdout, "{}", path)?;
        }
        Ok(status)
    }
}

#[derive(argh::FromArgs)]
/// print lines matching a pattern
pub struct Grep {
    #[argh(positional)]
    /// the pattern to search for (a regular expression)
    pub pattern: String,

    #[argh(positional, greedy)]
    /// files to search.
    pub files: Vec<String>,

    #[argh(switch, short = 'w')]
    /// match only whole words (using non-word characters as boundaries)
    pub word_regexp: bool,

    #[argh(switch, short = 'i')]
    /// ignore case distinctions
    pub ignore_case: bool,

    #[argh(switch, short = 'n')]
    /// prefix each line with its line number
    pub line_number: bool,

    #[argh(option, short = 'A', default = "0")]
    /// print NUM lines of trailing context after matching lines
    pub after_context: usize,
}

impl Grep {
    /// Writes matching lines (and context) of one file; returns whether anything matched.
    fn process_source(&self, content: &str, out: &mut Vec<u8>, file_name: Option<&str>, re: &Regex) -> io::Result<bool> {
        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let mut to_print = vec![false; total_lines];
        let mut matched = false;

        for (i, line) in lines.iter().enumerate() {
            if re.is_match(line) {
                matched = true;
                let end_print = (i + self.after_context + 1).min(total_lines);
                for flag in &mut to_print[i..end_print] {
                    *flag = true;
                }
            }
        }

        let prefix = file_name.map(|name| format!("{}:", name)).unwrap_or_default();
        let mut last_printed_index: Option<usize> = None;
        for (i, line) in lines.iter().enumerate() {
            if !to_print[i] {
                continue;
            }
            if self.after_context > 0 && last_printed_index.is_some_and(|last| i > last + 1) {
                out.write_all(b"--\n")?;
            }
            if self.line_number {
                writeln!(out, "{}{}:{}", prefix, i + 1, line)?;
            } else {
                writeln!(out, "{}{}", prefix, line)?;
            }
            last_printed_index = Some(i);
        }
        Ok(matched)
    }
}

impl BuiltinCommand for Grep {
    fn name() -> &'static str {
        "grep"
    }

    fn summary() -> &'static str {
        "Search text patterns in files"
    }

    fn usage() -> &'static str {
        "grep [-i] [-n] [-w] [-A N] <pattern> <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        if self.files.is_empty() {
            bail!("no files to search");
        }
        let pattern = if self.word_regexp {
            format!(r"\b({})\b", self.pattern)
        } else {
            self.pattern.clone()
        };
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .with_context(|| format!("invalid regex pattern: {}", pattern))?;

        let show_names = self.files.len() > 1;
        let mut any_match = false;
        let mut any_error = false;
        for file_name in &self.files {
            match fs::read(ctx.env.resolve_path(file_name)) {
                Ok(content) => {
                    let text = String::from_utf8_lossy(&content);
                    let shown = show_names.then_some(file_name.as_str());
                    any_match |= self.process_source(&text, &mut ctx.stdout, shown, &re)?;
                }
                Err(e) => {
                    report(ctx, "grep", format!("{}: {}", file_name, io_reason(&e)))?;
                    any_error = true;
                }
            }
        }
        Ok(match (any_error, any_match) {
            (true, _) => 2,
            (false, true) => 0,
            (false, false) => 1,
        })
    }
}

#[derive(argh::FromArgs)]
/// count lines, words and bytes
pub struct Wc {
    #[argh(positional, greedy)]
    /// files to count.
    pub files: Vec<String>,
}

impl BuiltinCommand for Wc {
    fn name() -> &'static str {
        "wc"
    }

    fn summary() -> &'static str {
        "Count lines, words and bytes"
    }

    fn usage() -> &'static str {
        "wc <file>..."
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let mut totals = (0, 0, 0);
        let status = for_each_file(ctx, "wc", &self.files, |ctx, name, content| {
            let text = String::from_utf8_lossy(&content);
            let lines = text.matches('\n').count();
            let words = text.split_whitespace().count();
            let bytes = content.len();
            totals = (totals.0 + lines, totals.1 + words, totals.2 + bytes);
            writeln!(ctx.stdout, "{} {} {} {}", lines, words, bytes, name)
        })?;
        if self.files.len() > 1 {
            writeln!(ctx.stdout, "{} {} {} total", totals.0, totals.1, totals.2)?;
        }
        Ok(status)
    }
}
