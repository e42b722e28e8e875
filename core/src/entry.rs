//! Table entries and their ranking key.
//!
//! An `Entry` is one row of a code table. Entries sharing a code are ranked:
//! boosted rows first, then by priority (highest first, a missing priority
//! counts as 0), then by the order in which they were loaded.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Longest code the decoder will buffer before forcing a resolution.
pub const MAX_CODE_LEN: usize = 4;

/// True if `code` is 1 to `MAX_CODE_LEN` ASCII lowercase letters.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LEN && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// One row of a code table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// File name (not the full path) the row was read from.
    pub source_file: String,
    pub code: String,
    pub word: String,
    /// Manually marked to rank above unmarked rows with the same code.
    pub boosted: bool,
    pub priority: Option<f64>,
    /// Position in load order across the whole generation.
    pub seq: usize,
}

impl Entry {
    pub fn new<F, C, W>(source_file: F, code: C, word: W) -> Self
    where
        F: Into<String>,
        C: Into<String>,
        W: Into<String>,
    {
        Self {
            source_file: source_file.into(),
            code: code.into(),
            word: word.into(),
            boosted: false,
            priority: None,
            seq: 0,
        }
    }

    pub fn boosted(mut self, boosted: bool) -> Self {
        self.boosted = boosted;
        self
    }

    pub fn with_priority(mut self, priority: Option<f64>) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_seq(mut self, seq: usize) -> Self {
        self.seq = seq;
        self
    }

    /// Priority used for ranking. A missing priority ranks as 0, and -0.0 is
    /// folded into 0.0 so `total_cmp` treats them as equal.
    pub fn effective_priority(&self) -> f64 {
        match self.priority {
            Some(p) if p != 0.0 => p,
            _ => 0.0,
        }
    }

    /// Total order of the ranked view: code, boosted first, priority
    /// descending, load order.
    pub fn rank_cmp(&self, other: &Entry) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| other.boosted.cmp(&self.boosted))
            .then_with(|| other.effective_priority().total_cmp(&self.effective_priority()))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} in {}", self.code, self.word, self.source_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, word: &str, seq: usize) -> Entry {
        Entry::new("t.txt", code, word).with_seq(seq)
    }

    #[test]
    fn valid_codes() {
        assert!(is_valid_code("a"));
        assert!(is_valid_code("abcd"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("abcde"));
        assert!(!is_valid_code("aB"));
        assert!(!is_valid_code("a1"));
        assert!(!is_valid_code("é"));
    }

    #[test]
    fn code_orders_first() {
        let a = entry("ab", "x", 5).boosted(false);
        let b = entry("abc", "y", 0).boosted(true);
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
    }

    #[test]
    fn boosted_beats_priority() {
        let plain = entry("ab", "x", 0).with_priority(Some(100.0));
        let top = entry("ab", "y", 1).boosted(true);
        assert_eq!(top.rank_cmp(&plain), Ordering::Less);
    }

    #[test]
    fn higher_priority_first_then_load_order() {
        let low = entry("ab", "x", 0).with_priority(Some(1.0));
        let high = entry("ab", "y", 1).with_priority(Some(2.5));
        assert_eq!(high.rank_cmp(&low), Ordering::Less);

        let first = entry("ab", "x", 0);
        let second = entry("ab", "y", 1);
        assert_eq!(first.rank_cmp(&second), Ordering::Less);
    }

    #[test]
    fn missing_priority_ties_with_zero() {
        let none = entry("ab", "x", 1);
        let zero = entry("ab", "y", 0).with_priority(Some(-0.0));
        assert_eq!(none.effective_priority(), zero.effective_priority());
        // tie falls through to load order
        assert_eq!(zero.rank_cmp(&none), Ordering::Less);
    }

    #[test]
    fn negative_priority_ranks_below_missing() {
        let neg = entry("ab", "x", 0).with_priority(Some(-1.0));
        let none = entry("ab", "y", 1);
        assert_eq!(none.rank_cmp(&neg), Ordering::Less);
    }

    #[test]
    fn display_format() {
        let e = Entry::new("single.txt", "wq", "你");
        assert_eq!(e.to_string(), "wq 你 in single.txt");
    }
}
