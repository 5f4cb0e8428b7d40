//! Regex-backed tests with full-match semantics.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ProfilerError, Result};

/// Detects an inline flag group that turns on verbose mode.
static VERBOSE_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\?[imsRUu]*x[imsRUux]*[:)]").unwrap());

/// A compiled pattern that must match the entire field value.
#[derive(Clone)]
pub struct RegexTest {
    source: String,
    regex: Regex,
}

impl RegexTest {
    /// Compile `pattern`, anchoring it at both ends.
    ///
    /// `test` names the owning test and is only used for error context.
    pub fn compile(test: &str, pattern: &str) -> Result<Self> {
        // A verbose-mode comment on the last line would swallow the closing
        // anchor, so end the user pattern with a newline in that case.
        let anchored = if VERBOSE_FLAG.is_match(pattern) {
            format!("^(?:{pattern}\n)$")
        } else {
            format!("^(?:{pattern})$")
        };
        let regex = Regex::new(&anchored).map_err(|source| ProfilerError::Regex {
            test: test.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written, without anchors.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for RegexTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegexTest").field(&self.source).finish()
    }
}

impl fmt::Display for RegexTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.chars().count() > 40 {
            let head: String = self.source.chars().take(37).collect();
            write!(f, "regex {head}...")
        } else {
            write!(f, "regex {}", self.source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_only() {
        let re = RegexTest::compile("regex_zip", r"[0-9]{5}").unwrap();
        assert!(re.is_match("12345"));
        assert!(!re.is_match("123456"));
        assert!(!re.is_match("a12345"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let re = RegexTest::compile("t", r"ab|abc").unwrap();
        assert!(re.is_match("abc"));
        assert!(re.is_match("ab"));
        assert!(!re.is_match("abcd"));
    }

    #[test]
    fn test_verbose_pattern_with_trailing_comment() {
        let re = RegexTest::compile("t", "(?x) [a-z]+ # letters").unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("ab1"));
    }

    #[test]
    fn test_bad_pattern_reports_test_name() {
        let err = RegexTest::compile("regex_bad", "([a-z").unwrap_err();
        assert!(err.to_string().contains("regex_bad"));
    }

    #[test]
    fn test_display_truncates_long_patterns() {
        let re = RegexTest::compile("t", &"a".repeat(50)).unwrap();
        assert!(re.to_string().ends_with("..."));
    }
}
