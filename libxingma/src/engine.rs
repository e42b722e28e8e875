//! Xingma engine for libxingma
//!
//! Wraps a `TableStore` with the candidate-list and decoding calls a UI or a
//! keystroke capture layer needs.

use crate::config::XingmaConfig;
use libcodetable_core::{parse_tokens, Decoded, Entry, Key, SelectKey, TableError, TableStore};
use tracing::debug;

/// Public engine for libxingma
pub struct Engine {
    store: TableStore,
    /// Maximum candidates to return
    limit: usize,
}

impl Engine {
    pub fn new(config: XingmaConfig) -> Self {
        let limit = config.candidate_limit;
        debug!(dir = %config.base.table_dir.display(), limit, "creating engine");
        Self {
            store: TableStore::new(config.into_base()),
            limit,
        }
    }

    /// Construct an Engine from an existing store
    pub fn from_store(store: TableStore, limit: usize) -> Self {
        Self { store, limit }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Candidates for a partially typed code: exact matches first, then
    /// longer codes sharing the prefix.
    pub fn input(&self, code: &str) -> Result<Vec<Entry>, TableError> {
        if self.limit == 0 {
            return Ok(Vec::new());
        }
        let mut candidates = self.store.match_code(code, self.limit - 1, false)?;
        candidates.truncate(self.limit);
        Ok(candidates)
    }

    /// Exact candidates for `code`, each with the key that selects it.
    pub fn labelled(&self, code: &str) -> Result<Vec<(SelectKey, Entry)>, TableError> {
        let candidates = self.store.match_code(code, 9, true)?;
        Ok(candidates
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| SelectKey::for_ordinal(i).map(|key| (key, entry)))
            .take(self.limit)
            .collect())
    }

    /// Decode a whole key sequence.
    pub fn decode_keys<I>(&self, keys: I) -> Result<Vec<Decoded>, TableError>
    where
        I: IntoIterator<Item = Key>,
    {
        self.store.decode(keys).collect()
    }

    /// Decode whitespace-separated token names (`"w q space , enter"`).
    pub fn decode_line(&self, line: &str) -> Result<Vec<Decoded>, TableError> {
        self.decode_keys(parse_tokens(line))
    }

    /// Text a key sequence would insert.
    pub fn commit_text(&self, line: &str) -> Result<String, TableError> {
        Ok(self
            .decode_line(line)?
            .iter()
            .filter_map(Decoded::text)
            .collect())
    }

    /// Codes producing `word`, best ranked first.
    pub fn reverse(&self, word: &str) -> Result<Vec<String>, TableError> {
        let table = self.store.table()?;
        Ok(table
            .codes_for_word(word)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}
