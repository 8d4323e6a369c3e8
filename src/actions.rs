//! The three handlers a run can apply to matched entries.

use std::fs::{self, OpenOptions};
use std::io::Write;

use colored::Colorize;

use crate::config::{Action, Verbosity};
use crate::error::{ActionFailure, ActionOp};
use crate::scanner::Entry;

/// Applies the run's selected action to each matched entry.
///
/// Output for Print and the Delete notice goes to `out`.
pub struct ActionHandler<W: Write> {
    action: Action,
    verbosity: Verbosity,
    color: bool,
    out: W,
}

impl<W: Write> ActionHandler<W> {
    pub fn new(action: Action, verbosity: Verbosity, out: W) -> Self {
        ActionHandler {
            action,
            verbosity,
            color: false,
            out,
        }
    }

    /// Colour the verbose `[match]` tag.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, entry: &Entry) -> Result<(), ActionFailure> {
        match self.action {
            Action::Print => self.print(entry),
            Action::Delete => self.delete(entry),
            Action::Touch => touch(entry),
        }
    }

    fn print(&mut self, entry: &Entry) -> Result<(), ActionFailure> {
        let result = match self.verbosity {
            Verbosity::Quiet => return Ok(()),
            Verbosity::Normal => writeln!(self.out, "{}", entry.path.display()),
            Verbosity::Verbose => {
                let tag = if self.color {
                    "[match]".cyan().to_string()
                } else {
                    "[match]".to_string()
                };
                writeln!(self.out, "{} {}", tag, entry.path.display())
            }
        };
        result.map_err(|source| ActionFailure {
            op: ActionOp::Print,
            path: entry.path.clone(),
            source,
        })
    }

    fn delete(&mut self, entry: &Entry) -> Result<(), ActionFailure> {
        if self.verbosity != Verbosity::Quiet {
            writeln!(self.out, "removing {}", entry.path.display()).map_err(|source| {
                ActionFailure {
                    op: ActionOp::Print,
                    path: entry.path.clone(),
                    source,
                }
            })?;
        }

        let removal = if entry.is_dir {
            fs::remove_dir_all(&entry.path)
        } else {
            fs::remove_file(&entry.path)
        };
        removal.map_err(|source| ActionFailure {
            op: ActionOp::Remove,
            path: entry.path.clone(),
            source,
        })?;

        tracing::debug!(path = %entry.path.display(), "removed");
        Ok(())
    }
}

/// Create the file if it is missing. Never truncates, and leaves directories
/// and symlinks alone; a link is never followed to create its target.
fn touch(entry: &Entry) -> Result<(), ActionFailure> {
    if entry.is_dir {
        return Ok(());
    }
    if fs::symlink_metadata(&entry.path).is_ok_and(|meta| meta.is_symlink()) {
        return Ok(());
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&entry.path)
        .map(drop)
        .map_err(|source| ActionFailure {
            op: ActionOp::Touch,
            path: entry.path.clone(),
            source,
        })
}
