//! Keystroke stream decoder.
//!
//! The decoder buffers up to `MAX_CODE_LEN` letters and resolves them against
//! a table when a selection key, a punctuation key or a fifth letter arrives,
//! or as soon as a full-length code has a single candidate.
//!
//! Transitions (buffer empty / non-empty):
//! - cancel: nothing / clear the buffer
//! - confirm: `Sign("enter")` / clear the buffer
//! - selection key: `Number` for digits, `Sign` otherwise / select a candidate
//! - punctuation: `Sign` / first candidate, then `Sign`
//! - letter: buffer it; a full buffer with one candidate is emitted at once,
//!   a fifth letter flushes the top candidate and starts a new code
//! - anything else is ignored

use crate::entry::{Entry, MAX_CODE_LEN};
use crate::error::TableError;
use crate::keys::{Key, SelectKey, CONFIRM_TOKEN};
use crate::table::CodeTable;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One decoder output item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Decoded {
    Matched(Entry),
    /// Code plus selection token that had no candidate, e.g. `"abcd2"`.
    Undefine(String),
    /// Punctuation or a control key with nothing pending.
    Sign(String),
    /// Digit typed with nothing pending.
    Number(String),
}

impl Decoded {
    /// Text to insert, if any. Undefine markers and the confirm sign have none.
    pub fn text(&self) -> Option<&str> {
        match self {
            Decoded::Matched(entry) => Some(&entry.word),
            Decoded::Sign(sign) if sign == CONFIRM_TOKEN => None,
            Decoded::Sign(text) | Decoded::Number(text) => Some(text),
            Decoded::Undefine(_) => None,
        }
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Decoded::Matched(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_undefine(&self) -> bool {
        matches!(self, Decoded::Undefine(_))
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Matched(entry) => write!(f, "{entry}"),
            Decoded::Undefine(code) => write!(f, "{code} undefine"),
            Decoded::Sign(sign) => write!(f, "{sign} sign"),
            Decoded::Number(digit) => write!(f, "{digit} number"),
        }
    }
}

/// Buffered letter state. One instance per keystroke stream.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    buffer: String,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Letters typed but not yet resolved.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Whether `feed(key, ..)` will consult the table.
    pub fn needs_table(&self, key: &Key) -> bool {
        match key {
            Key::Letter(_) => true,
            Key::Select(_) | Key::Sign(_) => !self.buffer.is_empty(),
            Key::Confirm | Key::Cancel | Key::Other(_) => false,
        }
    }

    /// Consume one key, returning zero, one or two output items.
    pub fn feed(&mut self, key: &Key, table: &CodeTable) -> Vec<Decoded> {
        let mut out = Vec::new();
        match key {
            Key::Cancel => self.buffer.clear(),
            Key::Confirm => {
                if self.buffer.is_empty() {
                    out.push(Decoded::Sign(CONFIRM_TOKEN.to_string()));
                } else {
                    self.buffer.clear();
                }
            }
            Key::Select(sel) => {
                if self.buffer.is_empty() {
                    out.push(match sel {
                        SelectKey::Digit(_) => Decoded::Number(sel.token().to_string()),
                        _ => Decoded::Sign(sel.token().to_string()),
                    });
                } else {
                    let code = std::mem::take(&mut self.buffer);
                    out.push(table.select_candidate(&code, *sel));
                }
            }
            Key::Sign(c) => {
                if !self.buffer.is_empty() {
                    let code = std::mem::take(&mut self.buffer);
                    out.push(table.select_candidate(&code, SelectKey::Space));
                }
                out.push(Decoded::Sign(c.to_string()));
            }
            Key::Letter(c) => {
                if self.buffer.len() >= MAX_CODE_LEN {
                    let code = std::mem::take(&mut self.buffer);
                    match table.match_code(&code, 1, true).first() {
                        Some(top) => out.push(Decoded::Matched((*top).clone())),
                        None => debug!(code = %code, "dropping code without candidates"),
                    }
                }
                self.buffer.push(*c);
                if self.buffer.len() == MAX_CODE_LEN {
                    if let [only] = table.match_code(&self.buffer, 2, true).as_slice() {
                        out.push(Decoded::Matched((*only).clone()));
                        self.buffer.clear();
                    }
                }
            }
            Key::Other(_) => {}
        }
        out
    }
}

/// Something that hands out the table generation to decode against.
pub trait TableSource {
    fn table(&self) -> Result<Arc<CodeTable>, TableError>;
}

impl TableSource for Arc<CodeTable> {
    fn table(&self) -> Result<Arc<CodeTable>, TableError> {
        Ok(Arc::clone(self))
    }
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn table(&self) -> Result<Arc<CodeTable>, TableError> {
        (**self).table()
    }
}

/// Lazy decoded stream over a key iterator. Created by `decode`.
///
/// Fetches the table from its source before every key that needs a lookup, so
/// a long-running stream sees table reloads. A table error is yielded once and
/// ends the stream.
pub struct Decode<S, I> {
    source: S,
    keys: I,
    decoder: Decoder,
    queue: VecDeque<Decoded>,
    idle_table: Arc<CodeTable>,
    finished: bool,
}

impl<S, I> Decode<S, I> {
    /// Letters buffered so far.
    pub fn pending(&self) -> &str {
        self.decoder.pending()
    }
}

/// Decode `keys` against the tables handed out by `source`.
pub fn decode<S, I>(source: S, keys: I) -> Decode<S, I::IntoIter>
where
    S: TableSource,
    I: IntoIterator<Item = Key>,
{
    Decode {
        source,
        keys: keys.into_iter(),
        decoder: Decoder::new(),
        queue: VecDeque::new(),
        idle_table: Arc::new(CodeTable::empty()),
        finished: false,
    }
}

impl<S, I> Iterator for Decode<S, I>
where
    S: TableSource,
    I: Iterator<Item = Key>,
{
    type Item = Result<Decoded, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.queue.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            let Some(key) = self.keys.next() else {
                self.finished = true;
                return None;
            };

            let table = if self.decoder.needs_table(&key) {
                match self.source.table() {
                    Ok(table) => table,
                    Err(err) => {
                        self.finished = true;
                        return Some(Err(err));
                    }
                }
            } else {
                Arc::clone(&self.idle_table)
            };
            self.queue.extend(self.decoder.feed(&key, &table));
        }
    }
}
