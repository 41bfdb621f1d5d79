use regex::Regex;

use crate::error::{ScanError, ScanResult};

/// Decides whether a single line matches.
pub trait Matcher: Send + Sync {
    fn is_match(&self, line: &str) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, line: &str) -> bool {
        self(line)
    }
}

/// Matches lines containing a regular expression anywhere.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> ScanResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for RegexMatcher {
    fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}
