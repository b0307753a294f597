use anyhow::{Context, Result};
use argh::FromArgs;
use natsh::{Classifier, Engine, Environment, repl};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// An interactive shell that also understands plain-English requests.
struct Args {
    #[argh(option, short = 'c')]
    /// run one line and exit with its status.
    command: Option<String>,

    #[argh(option)]
    /// startup file to run first (default: ~/.natshrc).
    rc: Option<PathBuf>,

    #[argh(switch)]
    /// do not run a startup file.
    no_rc: bool,

    #[argh(switch)]
    /// treat every line as a literal command.
    no_natural_language: bool,

    #[argh(switch)]
    /// report sentences no rule understands instead of running them as programs.
    strict: bool,

    #[argh(option)]
    /// where to keep line history (default: ~/.natsh_history).
    history_file: Option<PathBuf>,

    #[argh(switch, short = 'v')]
    /// log every pipeline stage to stderr.
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);

    let env = Environment::new();
    let home = env.home_dir();
    let mut engine = Engine::new(env).with_classifier(Classifier {
        natural_language: !args.no_natural_language,
        external_fallback: !args.strict,
    });

    if !args.no_rc {
        match &args.rc {
            Some(path) => run_rc(&mut engine, path, true)?,
            None => {
                if let Some(home) = &home {
                    run_rc(&mut engine, &home.join(".natshrc"), false)?;
                }
            }
        }
    }

    let status = match args.command {
        Some(line) => {
            let result = engine.run_line(&line);
            repl::print_result(&result, io::stderr().is_terminal())?;
            engine.exit_requested().unwrap_or(result.status)
        }
        None => {
            let history = args
                .history_file
                .or_else(|| home.map(|h| h.join(".natsh_history")));
            repl::run(&mut engine, history.as_deref())?
        }
    };
    std::process::exit(status);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("natsh=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Runs each non-blank, non-comment line of `path` as a literal command.
///
/// A missing default file is fine; a missing file named with `--rc` is not.
fn run_rc(engine: &mut Engine, path: &Path, explicit: bool) -> Result<()> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => return Ok(()),
        Err(err) => return Err(err).with_context(|| format!("failed to read {}", path.display())),
    };

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let result = engine.eval(line);
        if !result.success() {
            warn!(rc = %path.display(), line, status = result.status, "startup line failed");
            repl::print_result(&result, false)?;
        }
    }
    Ok(())
}
