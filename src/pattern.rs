//! `*` / `?` glob matching over whole strings.
//!
//! `*` matches any run of characters (including none), `?` matches exactly one
//! character, and everything else matches itself. There is no escaping and no
//! character classes. A match must consume the entire text with the entire
//! pattern.

/// Returns true if `text` is fully matched by `pattern`.
///
/// Uses the greedy two-pointer algorithm: on a mismatch we resume from the
/// most recent `*`, letting it swallow one more character. Each `*` only ever
/// moves forward, so the worst case is O(pattern * text) rather than
/// exponential.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    // (pattern index after the star, text index the star resumes from)
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p + 1, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    // Text is exhausted; only trailing stars may remain.
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Straight recursive backtracking, kept as the reference the fast
    /// matcher is checked against.
    fn reference_match(pattern: &[char], text: &[char]) -> bool {
        match pattern.split_first() {
            None => text.is_empty(),
            Some(('*', rest)) => (0..=text.len()).any(|skip| reference_match(rest, &text[skip..])),
            Some((&c, rest)) => match text.split_first() {
                Some((&t, text_rest)) if c == '?' || c == t => reference_match(rest, text_rest),
                _ => false,
            },
        }
    }

    #[test]
    fn test_literal_requires_full_match() {
        assert!(glob_match("log", "log"));
        assert!(!glob_match("log", "alog"));
        assert!(!glob_match("log", "logs"));
        assert!(!glob_match("log", ""));
    }

    #[test]
    fn test_star_suffix() {
        assert!(glob_match("*.log", "a.log"));
        assert!(glob_match("*.log", ".log"));
        assert!(!glob_match("*.log", "a.log.gz"));
    }

    #[test]
    fn test_star_matches_empty_and_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything/at/all"));
        assert!(glob_match("**", "x"));
        assert!(glob_match("a*", "a"));
    }

    #[test]
    fn test_question_mark_is_exactly_one() {
        assert!(glob_match("?", "a"));
        assert!(!glob_match("?", ""));
        assert!(!glob_match("?", "ab"));
        assert!(glob_match("file?.txt", "file1.txt"));
        assert!(!glob_match("file?.txt", "file.txt"));
    }

    #[test]
    fn test_star_needs_backtracking() {
        assert!(glob_match("a*b*c", "aXbYbZc"));
        assert!(glob_match("*~", "notes~"));
        assert!(!glob_match("a*b*c", "aXbYbZ"));
        assert!(glob_match("cmake-build-*", "cmake-build-debug"));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(glob_match("", ""));
        assert!(!glob_match("", "a"));
    }

    #[test]
    fn test_unicode_counts_characters() {
        assert!(glob_match("?.txt", "é.txt"));
        assert!(glob_match("caf?", "café"));
    }

    #[test]
    fn test_adversarial_input_is_fast() {
        let pattern = "*a".repeat(30) + "b";
        let text = "a".repeat(200);
        assert!(!glob_match(&pattern, &text));
    }

    proptest! {
        #[test]
        fn agrees_with_reference(pattern in "[ab*?]{0,8}", text in "[ab]{0,10}") {
            let p: Vec<char> = pattern.chars().collect();
            let t: Vec<char> = text.chars().collect();
            prop_assert_eq!(glob_match(&pattern, &text), reference_match(&p, &t));
        }
    }
}
