//! RuleSweep - Rule-driven directory cleaner
//!
//! RuleSweep reads an ordered, gitignore-style rules file and classifies each
//! entry under a root directory as keep or delete. The last matching rule
//! wins. Entries marked for deletion are handed to one of three actions:
//! print (dry run), delete, or touch.
//!
//! ## Rules file
//!
//! ```text
//! # comment
//! build/          directories named `build`, at any depth
//! *.log           any `.log` entry
//! !/build/cache/  keep `build/cache` at the root
//! ```
//!
//! A directory marked for deletion is not descended into, so a nested `!`
//! rule cannot rescue anything inside it unless `protect_nested` is set.

pub mod actions;
pub mod config;
pub mod error;
pub mod pattern;
pub mod rules;
pub mod scanner;

use std::fs;
use std::io::{self, IsTerminal, Write};

// Re-export commonly used items
pub use actions::ActionHandler;
pub use config::{Action, ConfigFile, ConfigOverrides, RunConfiguration, Verbosity};
pub use error::{ActionFailure, ErrorKind, Result, SweepError};
pub use pattern::glob_match;
pub use rules::{Rule, RuleSet, Verdict};
pub use scanner::{scan, Entry, ScanOptions, Summary};

/// Read the rules file and run the configured action over the tree, writing
/// handler output to stdout.
pub fn execute(config: &RunConfiguration) -> Result<Summary> {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    execute_with(config, stdout.lock(), color)
}

/// Like [`execute`], with handler output sent to `out`.
pub fn execute_with<W: Write>(
    config: &RunConfiguration,
    out: W,
    color: bool,
) -> Result<Summary> {
    let bytes = fs::read(&config.rules_path).map_err(|source| SweepError::RulesUnreadable {
        path: config.rules_path.clone(),
        source,
    })?;
    // Stray non-UTF-8 bytes are replaced rather than rejected.
    let rules = RuleSet::parse(&String::from_utf8_lossy(&bytes));

    tracing::info!(
        root = %config.root.display(),
        rules = rules.len(),
        action = %config.action,
        recursive = config.recursive,
        "starting sweep"
    );

    let mut handler = ActionHandler::new(config.action, config.verbosity, out).with_color(color);
    let options = ScanOptions {
        recursive: config.recursive,
        protect_nested: config.protect_nested,
        keep_going: config.keep_going,
        calculate_sizes: config.calculate_sizes,
    };

    let summary = scan(&config.root, &rules, &mut handler, options)?;

    tracing::info!(
        visited = summary.visited,
        matched = summary.matched,
        "sweep complete"
    );
    Ok(summary)
}
