use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use humansize::{format_size, BINARY};
use tracing_subscriber::EnvFilter;

use rulesweep::{
    execute, Action, ConfigFile, ConfigOverrides, ErrorKind, RunConfiguration, SweepError,
    Verbosity,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Delete, list or touch entries in a directory tree using ordered glob rules",
    long_about = None
)]
struct Args {
    /// Directory to clean (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Rules file: one glob per line, `!` negates, leading `/` anchors, trailing `/` matches directories only
    #[arg(long, short = 'f', value_name = "FILE")]
    rules: Option<PathBuf>,

    /// What to do with matched entries: print, delete or touch [default: print]
    #[arg(long, short)]
    action: Option<String>,

    /// Descend into directories that are kept
    #[arg(long, short)]
    recursive: bool,

    /// Print nothing except errors
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,

    /// Tag matches in the output; repeat for debug logging
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,

    /// Look inside matched directories so nested `!` rules can keep entries there
    #[arg(long)]
    protect_nested: bool,

    /// Report every failed action at the end instead of stopping at the first
    #[arg(long)]
    keep_going: bool,

    /// Calculate the total size of matched entries
    #[arg(long)]
    sizes: bool,

    /// TOML file with default settings
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let default_level = if verbose >= 2 { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let file = args
        .config
        .as_deref()
        .map(ConfigFile::load)
        .transpose()?;

    let config = RunConfiguration::resolve(
        ConfigOverrides {
            root: args.root,
            rules: args.rules,
            action: args.action,
            recursive: args.recursive,
            quiet: args.quiet,
            verbose: args.verbose > 0,
            protect_nested: args.protect_nested,
            keep_going: args.keep_going,
            sizes: args.sizes,
        },
        file,
    )?;

    let summary = execute(&config)
        .with_context(|| format!("sweep of {} failed", config.root.display()))?;

    if config.verbosity != Verbosity::Quiet {
        let verb = match config.action {
            Action::Print => "matched",
            Action::Delete => "removed",
            Action::Touch => "touched",
        };
        let mut line = format!(
            "{} {} of {} entries",
            verb, summary.acted, summary.visited
        );
        if config.calculate_sizes {
            line.push_str(&format!(" ({})", format_size(summary.bytes, BINARY)));
        }
        eprintln!("{}", line.bold());
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SweepError>().map(SweepError::kind) {
        Some(ErrorKind::Config) => 2,
        Some(ErrorKind::Traversal) => 3,
        Some(ErrorKind::Action) => 4,
        None => 1,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}
