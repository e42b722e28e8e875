//! Keystroke token vocabulary.
//!
//! Keyboard hooks report keys by name: single characters for printable keys
//! and words such as `space`, `enter` and `esc` for the rest. `Key` sorts
//! those names into the classes the decoder cares about.

use std::fmt;

/// Punctuation keys emitted as sign markers. `;` and `'` are absent on
/// purpose: they select the second and third candidate.
pub const SIGN_KEYS: &str = ",.\":[]{}\\|~!@#$%^&*()-=_+`";

pub const SPACE_TOKEN: &str = "space";
pub const CONFIRM_TOKEN: &str = "enter";
pub const CANCEL_TOKEN: &str = "esc";

const DIGIT_TOKENS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Key that picks a candidate out of an ambiguous code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectKey {
    Space,
    Semicolon,
    Quote,
    /// Digit 0-9; selects the candidate at that index.
    Digit(u8),
}

impl SelectKey {
    /// 0-based candidate index this key selects.
    pub fn ordinal(self) -> usize {
        match self {
            SelectKey::Space => 0,
            SelectKey::Semicolon => 1,
            SelectKey::Quote => 2,
            SelectKey::Digit(d) => d as usize,
        }
    }

    /// Token text as reported by the keyboard hook.
    pub fn token(self) -> &'static str {
        match self {
            SelectKey::Space => SPACE_TOKEN,
            SelectKey::Semicolon => ";",
            SelectKey::Quote => "'",
            SelectKey::Digit(d) => DIGIT_TOKENS[(d as usize).min(9)],
        }
    }

    /// Preferred key for a candidate index: space, `;`, `'`, then digits 3-9.
    pub fn for_ordinal(ordinal: usize) -> Option<SelectKey> {
        match ordinal {
            0 => Some(SelectKey::Space),
            1 => Some(SelectKey::Semicolon),
            2 => Some(SelectKey::Quote),
            3..=9 => Some(SelectKey::Digit(ordinal as u8)),
            _ => None,
        }
    }

    pub fn from_token(token: &str) -> Option<SelectKey> {
        match Key::from_token(token) {
            Key::Select(sel) => Some(sel),
            _ => None,
        }
    }
}

impl fmt::Display for SelectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A classified keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Lowercase letter a-z, part of a code.
    Letter(char),
    Select(SelectKey),
    /// Punctuation from `SIGN_KEYS`.
    Sign(char),
    Confirm,
    Cancel,
    /// Anything else; the decoder ignores it.
    Other(String),
}

impl Key {
    pub fn from_token(token: &str) -> Key {
        match token {
            SPACE_TOKEN => return Key::Select(SelectKey::Space),
            CONFIRM_TOKEN => return Key::Confirm,
            CANCEL_TOKEN => return Key::Cancel,
            _ => {}
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::from_char(c),
            _ => Key::Other(token.to_string()),
        }
    }

    pub fn from_char(c: char) -> Key {
        match c {
            'a'..='z' => Key::Letter(c),
            '0'..='9' => Key::Select(SelectKey::Digit(c as u8 - b'0')),
            ';' => Key::Select(SelectKey::Semicolon),
            '\'' => Key::Select(SelectKey::Quote),
            c if SIGN_KEYS.contains(c) => Key::Sign(c),
            c => Key::Other(c.to_string()),
        }
    }

    /// Token text, the inverse of `from_token`.
    pub fn token(&self) -> String {
        match self {
            Key::Letter(c) | Key::Sign(c) => c.to_string(),
            Key::Select(sel) => sel.token().to_string(),
            Key::Confirm => CONFIRM_TOKEN.to_string(),
            Key::Cancel => CANCEL_TOKEN.to_string(),
            Key::Other(s) => s.clone(),
        }
    }
}

impl From<&str> for Key {
    fn from(token: &str) -> Self {
        Key::from_token(token)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Split whitespace-separated token names (`"a b space ; enter"`).
pub fn parse_tokens(text: &str) -> Vec<Key> {
    text.split_whitespace().map(Key::from_token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_named_tokens() {
        assert_eq!(Key::from_token("space"), Key::Select(SelectKey::Space));
        assert_eq!(Key::from_token("enter"), Key::Confirm);
        assert_eq!(Key::from_token("esc"), Key::Cancel);
        assert_eq!(Key::from_token("shift"), Key::Other("shift".into()));
    }

    #[test]
    fn classifies_single_chars() {
        assert_eq!(Key::from_token("q"), Key::Letter('q'));
        assert_eq!(Key::from_token("Q"), Key::Other("Q".into()));
        assert_eq!(Key::from_token("7"), Key::Select(SelectKey::Digit(7)));
        assert_eq!(Key::from_token(";"), Key::Select(SelectKey::Semicolon));
        assert_eq!(Key::from_token("'"), Key::Select(SelectKey::Quote));
        assert_eq!(Key::from_token(","), Key::Sign(','));
        assert_eq!(Key::from_token("\\"), Key::Sign('\\'));
        assert_eq!(Key::from_token("?"), Key::Other("?".into()));
        assert_eq!(Key::from_token("/"), Key::Other("/".into()));
    }

    #[test]
    fn every_sign_key_is_a_sign() {
        for c in SIGN_KEYS.chars() {
            assert_eq!(Key::from_char(c), Key::Sign(c), "{c:?}");
        }
    }

    #[test]
    fn ordinals() {
        assert_eq!(SelectKey::Space.ordinal(), 0);
        assert_eq!(SelectKey::Semicolon.ordinal(), 1);
        assert_eq!(SelectKey::Quote.ordinal(), 2);
        assert_eq!(SelectKey::Digit(0).ordinal(), 0);
        assert_eq!(SelectKey::Digit(9).ordinal(), 9);
        assert_eq!(SelectKey::for_ordinal(4), Some(SelectKey::Digit(4)));
        assert_eq!(SelectKey::for_ordinal(10), None);
    }

    #[test]
    fn token_names_roundtrip() {
        for name in ["a", "z", "0", "space", ";", "'", "enter", "esc", ",", "`", "f1"] {
            assert_eq!(Key::from_token(name).token(), name);
        }
    }

    #[test]
    fn parse_token_list() {
        let keys = parse_tokens("a  b\tspace enter");
        assert_eq!(
            keys,
            vec![
                Key::Letter('a'),
                Key::Letter('b'),
                Key::Select(SelectKey::Space),
                Key::Confirm
            ]
        );
    }
}
