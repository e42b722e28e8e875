//! Auto-refreshing table handle.
//!
//! `TableStore` owns the current `CodeTable` generation for one directory.
//! Every access checks whether the directory changed since the generation was
//! loaded and rebuilds the whole table if so. The new generation is built
//! off to the side and swapped in under a short write lock; readers that
//! already hold an `Arc` keep using the old one.

use crate::config::TableConfig;
use crate::decoder::{decode, Decode, Decoded, TableSource};
use crate::entry::Entry;
use crate::error::TableError;
use crate::keys::{Key, SelectKey};
use crate::loader::{self, SourceFile};
use crate::table::{CodeTable, TableStats};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info};

pub struct TableStore {
    config: TableConfig,
    current: RwLock<Arc<CodeTable>>,
    /// Last time the directory was checked for changes.
    last_check: Mutex<Option<Instant>>,
    /// Serialises rebuilds.
    rebuild: Mutex<()>,
}

impl TableStore {
    /// Create a store. Nothing is read until the first access.
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(CodeTable::empty())),
            last_check: Mutex::new(None),
            rebuild: Mutex::new(()),
        }
    }

    /// Store over `dir` with default settings.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Self {
        Self::new(TableConfig::with_dir(dir))
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        &self.config.table_dir
    }

    /// Current generation, rebuilt first if the directory changed.
    pub fn table(&self) -> Result<Arc<CodeTable>, TableError> {
        let current = self.current();
        if !self.due_for_check(&current) {
            return Ok(current);
        }
        if !self.is_stale(&current)? {
            return Ok(current);
        }

        let _guard = lock(&self.rebuild);
        // another caller may have rebuilt while we waited for the lock
        let current = self.current();
        if current.generation() > 0 && !self.is_stale(&current)? {
            return Ok(current);
        }
        self.rebuild_locked(&current)
    }

    /// Current generation without any staleness check.
    pub fn current(&self) -> Arc<CodeTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Rebuild unconditionally.
    pub fn reload(&self) -> Result<Arc<CodeTable>, TableError> {
        let _guard = lock(&self.rebuild);
        let current = self.current();
        self.rebuild_locked(&current)
    }

    /// Whether `table` no longer reflects the directory: never loaded, a file
    /// was added or removed, or a file was modified after the load started.
    pub fn is_stale(&self, table: &CodeTable) -> Result<bool, TableError> {
        if table.generation() == 0 {
            return Ok(true);
        }
        let sources = loader::list_sources(self.dir(), &self.config)?;
        Ok(sources_changed(table, &sources))
    }

    /// Ranked candidates for `pattern`; see `CodeTable::match_code`.
    pub fn match_code(
        &self,
        pattern: &str,
        max_count: usize,
        exact_only: bool,
    ) -> Result<Vec<Entry>, TableError> {
        let table = self.table()?;
        Ok(table
            .match_code(pattern, max_count, exact_only)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn select_candidate(&self, code: &str, key: SelectKey) -> Result<Decoded, TableError> {
        Ok(self.table()?.select_candidate(code, key))
    }

    /// Entries for `word`, best ranked first.
    pub fn lookup_word(&self, word: &str) -> Result<Vec<Entry>, TableError> {
        let table = self.table()?;
        Ok(table.lookup_word(word).into_iter().cloned().collect())
    }

    pub fn stats(&self) -> Result<TableStats, TableError> {
        Ok(self.table()?.stats())
    }

    /// Lazily decode `keys`, refreshing the table as the stream advances.
    pub fn decode<I>(&self, keys: I) -> Decode<&Self, I::IntoIter>
    where
        I: IntoIterator<Item = Key>,
    {
        decode(self, keys)
    }

    fn due_for_check(&self, current: &CodeTable) -> bool {
        let now = Instant::now();
        let mut last = lock(&self.last_check);
        if current.generation() > 0 {
            if let Some(at) = *last {
                if now.duration_since(at) < self.config.refresh_interval() {
                    return false;
                }
            }
        }
        *last = Some(now);
        true
    }

    fn rebuild_locked(&self, previous: &CodeTable) -> Result<Arc<CodeTable>, TableError> {
        let loaded = loader::load_dir(self.dir(), &self.config)?;
        let report = loaded.report;
        let table = Arc::new(CodeTable::from_loaded(loaded, previous.generation() + 1));

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&table);
        info!(
            dir = %self.dir().display(),
            generation = table.generation(),
            files = report.files,
            entries = report.entries,
            skipped = report.skipped,
            "loaded code table"
        );
        Ok(table)
    }
}

impl TableSource for TableStore {
    fn table(&self) -> Result<Arc<CodeTable>, TableError> {
        TableStore::table(self)
    }
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("dir", &self.config.table_dir)
            .field("generation", &self.current().generation())
            .finish()
    }
}

fn sources_changed(table: &CodeTable, sources: &[SourceFile]) -> bool {
    let known = table.sources();
    if known.len() != sources.len() || known.iter().zip(sources).any(|(a, b)| a.name != b.name) {
        debug!(
            before = known.len(),
            after = sources.len(),
            "table file set changed"
        );
        return true;
    }
    if let Some(file) = sources.iter().find(|s| s.modified > table.loaded_at()) {
        debug!(file = %file.name, "table file modified since last load");
        return true;
    }
    false
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, at: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    fn old() -> SystemTime {
        SystemTime::now() - Duration::from_secs(600)
    }

    #[test]
    fn first_access_loads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "甲\ta\n").unwrap();
        let store = TableStore::open(dir.path());
        assert_eq!(store.current().generation(), 0);

        let table = store.table().unwrap();
        assert_eq!(table.generation(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unchanged_directory_keeps_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "甲\ta\n").unwrap();
        set_mtime(&path, old());

        let store = TableStore::open(dir.path());
        let first = store.table().unwrap();
        let second = store.table().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!store.is_stale(&second).unwrap());
    }

    #[test]
    fn added_file_is_stale_even_if_old() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "甲\ta\n").unwrap();
        set_mtime(&a, old());

        let store = TableStore::open(dir.path());
        store.table().unwrap();

        let b = dir.path().join("b.txt");
        fs::write(&b, "乙\tb\n").unwrap();
        set_mtime(&b, old());
        let table = store.table().unwrap();
        assert_eq!(table.generation(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn debounce_skips_checks_within_interval() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "甲\ta\n").unwrap();
        set_mtime(&a, old());

        let mut config = TableConfig::with_dir(dir.path());
        config.refresh_interval_ms = 60_000;
        let store = TableStore::new(config);
        store.table().unwrap();

        fs::write(dir.path().join("b.txt"), "乙\tb\n").unwrap();
        assert_eq!(store.table().unwrap().generation(), 1);
        assert_eq!(store.reload().unwrap().len(), 2);
    }

    #[test]
    fn missing_directory_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::open(dir.path().join("missing"));
        assert!(store.table().is_err());
        assert!(store.match_code("a", 1, false).is_err());
    }

    #[test]
    fn store_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TableStore>();
    }
}
