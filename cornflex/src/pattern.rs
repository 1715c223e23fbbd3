//! Glob matching of remote file names.

use glob::Pattern;

use crate::error::{ConfigError, Result};

/// Matches bare file names against a shell-style glob (e.g. `*.csv`).
#[derive(Debug, Clone)]
pub struct FileMatcher {
    pattern: Pattern,
}

impl FileMatcher {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Check whether a file name matches.
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches(file_name)
    }

    /// Keep the matching names, sorted lexicographically.
    pub fn filter<I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut matched: Vec<String> = names.into_iter().filter(|n| self.matches(n)).collect();
        matched.sort();
        matched
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extension_filter() {
        let m = FileMatcher::new("*.csv").unwrap();
        let out = m.filter(names(&["users.csv", "notes.txt", "orders.csv"]));
        assert_eq!(out, vec!["orders.csv", "users.csv"]);
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let m = FileMatcher::new("*").unwrap();
        assert!(m.matches("anything.bin"));
        assert!(m.matches(".hidden"));
    }

    #[test]
    fn test_question_mark_and_class() {
        let m = FileMatcher::new("report_20[0-9][0-9]_?.xml").unwrap();
        assert!(m.matches("report_2024_a.xml"));
        assert!(!m.matches("report_2024_ab.xml"));
        assert!(!m.matches("report_19xx_a.xml"));
    }

    #[test]
    fn test_case_sensitive() {
        let m = FileMatcher::new("*.csv").unwrap();
        assert!(!m.matches("ORDERS.CSV"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileMatcher::new("[unclosed").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
