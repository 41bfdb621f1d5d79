use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One source line that matched a pattern, with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchedLine {
    /// Line number within the file, starting at 1.
    pub line_number: u64,
    /// The line text without its trailing newline.
    pub text: String,
}

impl MatchedLine {
    /// Create a matched line, rejecting line number 0.
    pub fn new(line_number: u64, text: impl Into<String>) -> Result<Self, TypeError> {
        if line_number == 0 {
            return Err(TypeError::InvalidLineNumber(line_number));
        }
        Ok(Self {
            line_number,
            text: text.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_start_at_one() {
        assert_eq!(
            MatchedLine::new(0, "x").unwrap_err(),
            TypeError::InvalidLineNumber(0)
        );
        let line = MatchedLine::new(2, "ERROR: disk full").unwrap();
        assert_eq!(line.line_number, 2);
        assert_eq!(line.text, "ERROR: disk full");
    }
}
