//! Path exclusion matching.
//!
//! # Responsibilities
//! - Match a decoded request path against configured patterns
//! - Combine patterns with OR semantics (any match excludes)
//!
//! # Design Decisions
//! - Patterns are compiled once, at server construction
//! - Matching is against the decoded path only (no query, no fragment)
//! - Empty set never matches

use regex::Regex;

/// Trait for matching request paths against conditions.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a path against a regular expression.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Regex,
}

impl PatternMatcher {
    /// Compile a new pattern matcher.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl PathMatcher for PatternMatcher {
    fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Paths that are never treated as fallback candidates.
#[derive(Debug, Default)]
pub struct ExclusionSet {
    matchers: Vec<Box<dyn PathMatcher>>,
}

impl ExclusionSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let matchers = patterns
            .iter()
            .map(|p| PatternMatcher::new(p.as_ref()).map(|m| Box::new(m) as Box<dyn PathMatcher>))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl PathMatcher for ExclusionSet {
    fn matches(&self, path: &str) -> bool {
        // Any matcher excludes (OR)
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matcher() {
        let matcher = PatternMatcher::new("^/api/").unwrap();
        assert!(matcher.matches("/api/users"));
        assert!(!matcher.matches("/dashboard"));
        assert!(!matcher.matches("/v1/api/users"));
    }

    #[test]
    fn test_exclusion_set_any() {
        let set = ExclusionSet::compile(&["^/api", "^/admin$"]).unwrap();
        assert!(set.matches("/api"));
        assert!(set.matches("/admin"));
        assert!(!set.matches("/admin/users"));
        assert!(!set.matches("/"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = ExclusionSet::default();
        assert!(set.is_empty());
        assert!(!set.matches("/anything"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ExclusionSet::compile(&["(oops"]).is_err());
    }
}
