//! Error types for a sweep run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SweepError>;

/// Broad failure class, used by the binary to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Traversal,
    Action,
}

/// Filesystem operation an action handler was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOp {
    Remove,
    Touch,
    Print,
}

impl fmt::Display for ActionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionOp::Remove => "remove",
            ActionOp::Touch => "touch",
            ActionOp::Print => "print",
        })
    }
}

/// One failed handler invocation.
#[derive(Debug, Error)]
#[error("failed to {op} {}: {source}", .path.display())]
pub struct ActionFailure {
    pub op: ActionOp,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to read rules file {}: {source}", .path.display())]
    RulesUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no rules file given (use --rules or set `rules` in the config file)")]
    MissingRules,

    #[error("unknown action '{0}' (expected print, delete or touch)")]
    UnknownAction(String),

    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    ConfigFileInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to list directory {}: {source}", .path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Action(#[from] ActionFailure),

    #[error("{} action(s) failed:\n{}", .0.len(), list_failures(.0))]
    Actions(Vec<ActionFailure>),
}

impl SweepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::RulesUnreadable { .. }
            | SweepError::MissingRules
            | SweepError::UnknownAction(_)
            | SweepError::ConfigFileUnreadable { .. }
            | SweepError::ConfigFileInvalid { .. } => ErrorKind::Config,
            SweepError::Traversal { .. } => ErrorKind::Traversal,
            SweepError::Action(_) | SweepError::Actions(_) => ErrorKind::Action,
        }
    }

    pub(crate) fn traversal(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SweepError::Traversal {
            path: path.into(),
            source,
        }
    }
}

fn list_failures(failures: &[ActionFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}
