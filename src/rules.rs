//! Rule model, rules-file parsing and last-match-wins evaluation.

use std::fmt;

use crate::pattern::glob_match;
use crate::scanner::Entry;

/// Keep/delete decision for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Delete,
}

/// One line of a rules file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Glob body with the `!`, leading `/` and trailing `/` markers removed.
    pub pattern: String,
    /// A match keeps the entry instead of deleting it.
    pub negated: bool,
    /// Only applies to directories.
    pub dir_only: bool,
    /// Matches the whole path relative to the root, never a deeper suffix.
    pub anchored: bool,
    /// 1-based line number in the rules file.
    pub line: usize,
}

impl Rule {
    /// Parse a single rules-file line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(raw: &str, line: usize) -> Option<Rule> {
        let mut body = raw.trim_matches([' ', '\t', '\r']);
        if body.is_empty() || body.starts_with('#') {
            return None;
        }

        let negated = match body.strip_prefix('!') {
            Some(rest) => {
                body = rest;
                true
            }
            None => false,
        };
        let anchored = match body.strip_prefix('/') {
            Some(rest) => {
                body = rest;
                true
            }
            None => false,
        };
        let dir_only = match body.strip_suffix('/') {
            Some(rest) => {
                body = rest;
                true
            }
            None => false,
        };

        Some(Rule {
            pattern: body.to_string(),
            negated,
            dir_only,
            anchored,
            line,
        })
    }

    /// Does this rule's pattern match `relative_path`?
    ///
    /// Anchored rules test the full path. Unanchored rules test every suffix
    /// that starts at a segment boundary, so `*.log` matches `a/b/c.log`.
    /// The directory-only qualifier is not checked here.
    pub fn matches(&self, relative_path: &str) -> bool {
        if self.anchored {
            return glob_match(&self.pattern, relative_path);
        }

        if glob_match(&self.pattern, relative_path) {
            return true;
        }
        relative_path
            .match_indices('/')
            .any(|(idx, _)| glob_match(&self.pattern, &relative_path[idx + 1..]))
    }

    /// Does this rule apply to the entry at all (directory qualifier included)?
    pub fn applies_to(&self, relative_path: &str, is_dir: bool) -> bool {
        (!self.dir_only || is_dir) && self.matches(relative_path)
    }

    fn verdict(&self) -> Verdict {
        if self.negated {
            Verdict::Keep
        } else {
            Verdict::Delete
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        if self.anchored {
            f.write_str("/")?;
        }
        f.write_str(&self.pattern)?;
        if self.dir_only {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Ordered rules from one rules file. Order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse rules-file text. Never fails; lines that are not rules are skipped.
    pub fn parse(text: &str) -> RuleSet {
        let rules = text
            .split('\n')
            .enumerate()
            .filter_map(|(idx, line)| Rule::parse_line(line, idx + 1))
            .collect();
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if any rule can turn a Delete back into a Keep.
    pub fn has_negations(&self) -> bool {
        self.rules.iter().any(|r| r.negated)
    }

    /// Last-match-wins verdict for an entry, starting from Keep.
    pub fn evaluate(&self, entry: &Entry) -> Verdict {
        self.evaluate_from(Verdict::Keep, entry)
    }

    /// Last-match-wins verdict starting from `initial` instead of Keep.
    ///
    /// Used for entries beneath a directory that was itself marked Delete,
    /// where the parent's verdict is inherited unless a later rule says
    /// otherwise.
    pub fn evaluate_from(&self, initial: Verdict, entry: &Entry) -> Verdict {
        self.deciding_rule(entry)
            .map(|rule| rule.verdict())
            .unwrap_or(initial)
    }

    /// The last rule that applies to the entry, if any.
    pub fn deciding_rule(&self, entry: &Entry) -> Option<&Rule> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.applies_to(&entry.relative_path, entry.is_dir))
    }
}
