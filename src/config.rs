//! Run configuration: the action selector, verbosity, and the optional TOML
//! defaults file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, SweepError};

/// What to do with each entry that gets a Delete verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Report the path only (dry run).
    Print,
    /// Remove the file, or the whole subtree for a directory.
    Delete,
    /// Create the file if missing, without truncating it.
    Touch,
}

impl FromStr for Action {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "print" => Ok(Action::Print),
            "delete" => Ok(Action::Delete),
            "touch" => Ok(Action::Touch),
            _ => Err(SweepError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Print => "print",
            Action::Delete => "delete",
            Action::Touch => "touch",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Resolved options for one run. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub root: PathBuf,
    pub rules_path: PathBuf,
    pub recursive: bool,
    pub action: Action,
    pub verbosity: Verbosity,
    /// Survey the subtree of a matched directory so nested `!` rules can
    /// still keep entries inside it. Only meaningful with `recursive`.
    pub protect_nested: bool,
    /// Collect action failures and carry on instead of stopping at the first.
    pub keep_going: bool,
    /// Add up the size of matched entries for the summary.
    pub calculate_sizes: bool,
}

impl RunConfiguration {
    /// Configuration with defaults: non-recursive, print, normal verbosity.
    pub fn new(root: impl Into<PathBuf>, rules_path: impl Into<PathBuf>) -> Self {
        RunConfiguration {
            root: root.into(),
            rules_path: rules_path.into(),
            recursive: false,
            action: Action::Print,
            verbosity: Verbosity::Normal,
            protect_nested: false,
            keep_going: false,
            calculate_sizes: false,
        }
    }

    /// Merge command-line values over an optional defaults file.
    pub fn resolve(overrides: ConfigOverrides, file: Option<ConfigFile>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let rules_path = overrides
            .rules
            .or(file.rules)
            .ok_or(SweepError::MissingRules)?;

        let action = match overrides.action.or(file.action) {
            Some(selector) => selector.parse()?,
            None => Action::Print,
        };

        // Verbosity is taken as a whole: any command-line flag replaces the file's.
        let (quiet, verbose) = if overrides.quiet || overrides.verbose {
            (overrides.quiet, overrides.verbose)
        } else {
            (file.quiet.unwrap_or(false), file.verbose.unwrap_or(false))
        };

        Ok(RunConfiguration {
            root: overrides.root,
            rules_path,
            recursive: overrides.recursive || file.recursive.unwrap_or(false),
            action,
            verbosity: Verbosity::from_flags(quiet, verbose),
            protect_nested: overrides.protect_nested || file.protect_nested.unwrap_or(false),
            keep_going: overrides.keep_going || file.keep_going.unwrap_or(false),
            calculate_sizes: overrides.sizes || file.sizes.unwrap_or(false),
        })
    }
}

/// Values given on the command line. Flags that are `false` fall back to the
/// defaults file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: PathBuf,
    pub rules: Option<PathBuf>,
    pub action: Option<String>,
    pub recursive: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub protect_nested: bool,
    pub keep_going: bool,
    pub sizes: bool,
}

/// Defaults file read from an explicit `--config` path.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub rules: Option<PathBuf>,
    pub action: Option<String>,
    pub recursive: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub protect_nested: Option<bool>,
    pub keep_going: Option<bool>,
    pub sizes: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SweepError::ConfigFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file: ConfigFile =
            toml::from_str(&text).map_err(|source| SweepError::ConfigFileInvalid {
                path: path.to_path_buf(),
                source,
            })?;

        // A relative rules path is relative to the config file, not the cwd.
        if let (Some(rules), Some(dir)) = (file.rules.as_ref(), path.parent()) {
            if rules.is_relative() {
                file.rules = Some(dir.join(rules));
            }
        }

        Ok(file)
    }
}
