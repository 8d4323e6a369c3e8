//! Directory traversal: evaluate each entry against the rules and hand the
//! matched ones to the action handler.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::actions::ActionHandler;
use crate::error::{ActionFailure, Result, SweepError};
use crate::rules::{RuleSet, Verdict};

/// A directory entry met during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Final path segment.
    pub name: String,
    /// Path from the traversal root, `/`-separated. This is what rules see.
    pub relative_path: String,
    /// Symlinks are never directories here; they are not followed.
    pub is_dir: bool,
    /// Filesystem path the handlers operate on.
    pub path: PathBuf,
}

impl Entry {
    pub fn new(root: &Path, relative_path: &str, is_dir: bool) -> Self {
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path)
            .to_string();
        Entry {
            name,
            relative_path: relative_path.to_string(),
            is_dir,
            path: root.join(relative_path),
        }
    }
}

/// Options controlling traversal behavior (runtime flags)
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub recursive: bool,
    pub protect_nested: bool,
    pub keep_going: bool,
    pub calculate_sizes: bool,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Entries evaluated against the rules.
    pub visited: usize,
    /// Entries handed to the action handler.
    pub matched: usize,
    /// Entries that got a Keep verdict.
    pub kept: usize,
    /// Handler invocations that succeeded.
    pub acted: usize,
    /// Size of matched entries, when sizes are calculated.
    pub bytes: u64,
}

/// Walk `root` and apply `handler` to every entry the rules mark for deletion.
///
/// A matched entry is never descended into. With `recursive`, kept directories
/// are walked depth-first; each directory is listed completely before any of
/// its children is visited.
pub fn scan<W: Write>(
    root: &Path,
    rules: &RuleSet,
    handler: &mut ActionHandler<W>,
    options: ScanOptions,
) -> Result<Summary> {
    let mut scanner = Scanner {
        rules,
        handler,
        options,
        summary: Summary::default(),
        failures: Vec::new(),
    };

    scanner.visit_dir(root, "")?;

    if !scanner.failures.is_empty() {
        return Err(SweepError::Actions(scanner.failures));
    }
    Ok(scanner.summary)
}

/// Entries under a matched directory, as decided by a survey.
struct Survey {
    /// Every descendant stays deleted; act on the directory as a whole.
    whole: bool,
    /// What to act on when `whole` is false.
    targets: Vec<Entry>,
}

struct Scanner<'a, W: Write> {
    rules: &'a RuleSet,
    handler: &'a mut ActionHandler<W>,
    options: ScanOptions,
    summary: Summary,
    failures: Vec<ActionFailure>,
}

impl<W: Write> Scanner<'_, W> {
    fn visit_dir(&mut self, dir: &Path, relative: &str) -> Result<()> {
        for entry in list_children(dir, relative)? {
            let verdict = self.evaluate(Verdict::Keep, &entry);

            match verdict {
                Verdict::Delete if self.should_survey(&entry) => {
                    let survey = self.survey(&entry, Verdict::Delete)?;
                    if survey.whole {
                        self.act(&entry)?;
                    } else {
                        for target in &survey.targets {
                            self.act(target)?;
                        }
                    }
                }
                Verdict::Delete => self.act(&entry)?,
                Verdict::Keep => {
                    if self.options.recursive && entry.is_dir {
                        self.visit_dir(&entry.path, &entry.relative_path)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Only worth looking inside a matched directory if some rule could keep
    /// something there.
    fn should_survey(&self, entry: &Entry) -> bool {
        self.options.recursive
            && self.options.protect_nested
            && entry.is_dir
            && self.rules.has_negations()
    }

    /// Decide everything beneath `dir` without acting. Entries inherit
    /// `inherited` unless a rule matches them.
    fn survey(&mut self, dir: &Entry, inherited: Verdict) -> Result<Survey> {
        let mut whole = inherited == Verdict::Delete;
        let mut targets = Vec::new();

        for entry in list_children(&dir.path, &dir.relative_path)? {
            let verdict = self.evaluate(inherited, &entry);

            match (verdict, entry.is_dir) {
                (Verdict::Delete, false) => targets.push(entry),
                (Verdict::Delete, true) => {
                    let nested = self.survey(&entry, Verdict::Delete)?;
                    if nested.whole {
                        targets.push(entry);
                    } else {
                        whole = false;
                        targets.extend(nested.targets);
                    }
                }
                (Verdict::Keep, false) => whole = false,
                (Verdict::Keep, true) => {
                    whole = false;
                    targets.extend(self.survey(&entry, Verdict::Keep)?.targets);
                }
            }
        }

        if !whole {
            tracing::debug!(path = %dir.relative_path, "matched directory keeps some of its contents");
        }
        Ok(Survey { whole, targets })
    }

    fn evaluate(&mut self, inherited: Verdict, entry: &Entry) -> Verdict {
        let verdict = self.rules.evaluate_from(inherited, entry);
        self.summary.visited += 1;
        if verdict == Verdict::Keep {
            self.summary.kept += 1;
        }
        tracing::debug!(path = %entry.relative_path, dir = entry.is_dir, ?verdict, "evaluated");
        verdict
    }

    fn act(&mut self, entry: &Entry) -> Result<()> {
        self.summary.matched += 1;
        if self.options.calculate_sizes {
            self.summary.bytes += entry_size(&entry.path);
        }

        match self.handler.handle(entry) {
            Ok(()) => {
                self.summary.acted += 1;
                Ok(())
            }
            Err(failure) if self.options.keep_going => {
                tracing::warn!("{failure}");
                self.failures.push(failure);
                Ok(())
            }
            Err(failure) => Err(failure.into()),
        }
    }
}

/// List a directory's children, sorted by name. The directory handle is
/// released before this returns.
fn list_children(dir: &Path, relative: &str) -> Result<Vec<Entry>> {
    let read_dir = fs::read_dir(dir).map_err(|err| SweepError::traversal(dir, err))?;

    let mut children = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|err| SweepError::traversal(dir, err))?;
        let file_type = dir_entry
            .file_type()
            .map_err(|err| SweepError::traversal(dir_entry.path(), err))?;

        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let relative_path = if relative.is_empty() {
            name.clone()
        } else {
            format!("{relative}/{name}")
        };

        children.push(Entry {
            name,
            relative_path,
            is_dir: file_type.is_dir(),
            path: dir_entry.path(),
        });
    }

    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

/// Size of a file, or of every file under a directory. Symlinks count as zero
/// and are not followed.
fn entry_size(path: &Path) -> u64 {
    let metadata = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => return 0,
    };

    if metadata.is_symlink() {
        return 0;
    }
    if metadata.is_file() {
        return metadata.len();
    }

    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
