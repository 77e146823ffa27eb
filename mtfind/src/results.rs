/// Result types produced by the search engine.
///
/// Positions are stored 0-based. The textual report and [`MatchRecord`] use
/// 1-based line and column numbers, the way editors and `grep -n` count.
use serde::Serialize;
use std::fmt;

/// A single occurrence of the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Match {
    /// Index of the line containing the match
    pub line: usize,
    /// Character offset of the first matched character within the line
    pub column: usize,
}

impl Match {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// True when a match of `width` characters starting here overlaps `later`
    pub fn overlaps(&self, later: &Match, width: usize) -> bool {
        self.line == later.line && later.column < self.column + width
    }
}

/// A match as presented to users: 1-based position plus the matched text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.line, self.column, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ordering() {
        let mut matches = vec![Match::new(2, 0), Match::new(0, 7), Match::new(0, 3)];
        matches.sort();
        assert_eq!(
            matches,
            vec![Match::new(0, 3), Match::new(0, 7), Match::new(2, 0)]
        );
    }

    #[test]
    fn test_overlaps() {
        let first = Match::new(4, 10);
        assert!(first.overlaps(&Match::new(4, 10), 3));
        assert!(first.overlaps(&Match::new(4, 12), 3));
        assert!(!first.overlaps(&Match::new(4, 13), 3));
        assert!(!first.overlaps(&Match::new(5, 11), 3));
    }

    #[test]
    fn test_record_display() {
        let record = MatchRecord {
            line: 104,
            column: 81,
            text: "God, said".to_string(),
        };
        assert_eq!(record.to_string(), "104 81 God, said");
    }
}
