//! One immutable table generation and its two sorted views.
//!
//! The rank view orders entries by `Entry::rank_cmp`, so all entries sharing a
//! code, and all entries sharing a code prefix, sit in one contiguous block.
//! The word view orders entries by word text for reverse lookup. Both views
//! are index vectors into the same entry list and are built together.

use crate::decoder::Decoded;
use crate::entry::Entry;
use crate::keys::SelectKey;
use crate::loader::{LoadedTable, SourceFile};
use std::time::SystemTime;

/// Summary numbers for a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub entries: usize,
    /// Distinct codes.
    pub codes: usize,
    pub boosted: usize,
    pub files: usize,
}

#[derive(Debug, Clone)]
pub struct CodeTable {
    /// Load order.
    entries: Vec<Entry>,
    by_rank: Vec<usize>,
    by_word: Vec<usize>,
    sources: Vec<SourceFile>,
    loaded_at: SystemTime,
    /// 0 until the first load; the store bumps it on every rebuild.
    generation: u64,
}

impl CodeTable {
    /// Placeholder generation that has never been loaded.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), SystemTime::UNIX_EPOCH, 0)
    }

    /// Build both views. `entries` must be in load order with their `seq` set.
    pub fn new(
        entries: Vec<Entry>,
        sources: Vec<SourceFile>,
        loaded_at: SystemTime,
        generation: u64,
    ) -> Self {
        let mut by_rank: Vec<usize> = (0..entries.len()).collect();
        by_rank.sort_by(|&a, &b| entries[a].rank_cmp(&entries[b]));

        // stable sort over the rank view keeps rank order within one word
        let mut by_word = by_rank.clone();
        by_word.sort_by(|&a, &b| entries[a].word.cmp(&entries[b].word));

        Self {
            entries,
            by_rank,
            by_word,
            sources,
            loaded_at,
            generation,
        }
    }

    pub fn from_loaded(loaded: LoadedTable, generation: u64) -> Self {
        Self::new(loaded.entries, loaded.sources, loaded.started_at, generation)
    }

    /// Build a generation from in-memory entries, renumbering `seq` by position.
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(seq, e)| e.with_seq(seq))
            .collect();
        Self::new(entries, Vec::new(), SystemTime::now(), 1)
    }

    /// Entries whose code equals `pattern` (`exact_only`) or starts with it,
    /// in rank order.
    ///
    /// Collects at most `max_count + 1` entries, so a caller asking for
    /// `max_count` can tell whether more exist.
    pub fn match_code(&self, pattern: &str, max_count: usize, exact_only: bool) -> Vec<&Entry> {
        let start = self
            .by_rank
            .partition_point(|&i| self.entries[i].code.as_str() < pattern);

        let mut found = Vec::new();
        for &i in &self.by_rank[start..] {
            let entry = &self.entries[i];
            let hit = if exact_only {
                entry.code == pattern
            } else {
                entry.code.starts_with(pattern)
            };
            if !hit {
                break;
            }
            found.push(entry);
            if found.len() > max_count {
                break;
            }
        }
        found
    }

    /// Resolve `code` with a selection key: the candidate at the key's ordinal,
    /// or `Decoded::Undefine(code + key)` when there are not enough candidates.
    pub fn select_candidate(&self, code: &str, key: SelectKey) -> Decoded {
        let ordinal = key.ordinal();
        match self.match_code(code, ordinal, true).get(ordinal) {
            Some(entry) => Decoded::Matched((*entry).clone()),
            None => Decoded::Undefine(format!("{code}{}", key.token())),
        }
    }

    /// All entries for `word`, in rank order.
    pub fn lookup_word(&self, word: &str) -> Vec<&Entry> {
        let start = self
            .by_word
            .partition_point(|&i| self.entries[i].word.as_str() < word);
        self.by_word[start..]
            .iter()
            .map(|&i| &self.entries[i])
            .take_while(|e| e.word == word)
            .collect()
    }

    /// Codes that produce `word`, best ranked first.
    pub fn codes_for_word(&self, word: &str) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for entry in self.lookup_word(word) {
            if !codes.contains(&entry.code.as_str()) {
                codes.push(&entry.code);
            }
        }
        codes
    }

    /// Entries in load order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries in rank order.
    pub fn ranked(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.by_rank.iter().map(|&i| &self.entries[i])
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// When the load that produced this generation started.
    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> TableStats {
        let mut codes = 0;
        let mut last: Option<&str> = None;
        for entry in self.ranked() {
            if last != Some(entry.code.as_str()) {
                codes += 1;
                last = Some(&entry.code);
            }
        }
        TableStats {
            entries: self.entries.len(),
            codes,
            boosted: self.entries.iter().filter(|e| e.boosted).count(),
            files: self.sources.len(),
        }
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::empty()
    }
}
