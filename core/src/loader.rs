//! Table loader.
//!
//! Reads every recognised file in a table directory. Each non-comment line
//! has the form `word<TAB>code[<marker>]<TAB>priority?`. A malformed line is
//! logged and skipped; an unreadable directory or file aborts the load.
//!
//! Files are read in file-name order so the load-order tie-break is the same
//! on every platform.

use crate::config::TableConfig;
use crate::entry::{is_valid_code, Entry};
use crate::error::{LineError, TableError};
use crate::utils::normalize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Fields of one accepted table line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub word: String,
    pub code: String,
    pub boosted: bool,
    pub priority: Option<f64>,
}

/// A table file seen in the directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Counters collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files: usize,
    pub entries: usize,
    pub skipped: usize,
}

/// Output of `load_dir`: one generation's worth of entries in load order.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub entries: Vec<Entry>,
    pub sources: Vec<SourceFile>,
    pub report: LoadReport,
    /// Taken before the directory was listed, so edits made during the load
    /// still count as newer than this generation.
    pub started_at: SystemTime,
}

/// Parse one raw line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, config: &TableConfig) -> Result<Option<ParsedLine>, LineError> {
    let line = line.trim();
    if line.is_empty() || config.is_comment(line) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 2 {
        return Err(LineError::MissingFields {
            found: fields.len(),
        });
    }

    let word = normalize(fields[0]);

    let raw_code = fields[1].trim();
    let (code, boosted) = match raw_code.split_once(config.boost_marker) {
        Some((before, _)) => (before.trim(), true),
        None => (raw_code, false),
    };
    if !is_valid_code(code) {
        return Err(LineError::InvalidCode(raw_code.to_string()));
    }

    let priority = match fields.get(2).map(|f| f.trim()) {
        None | Some("") => None,
        Some(text) => match text.parse::<f64>() {
            Ok(p) if p.is_finite() => Some(p),
            _ => return Err(LineError::InvalidPriority(text.to_string())),
        },
    };

    Ok(Some(ParsedLine {
        word,
        code: code.to_string(),
        boosted,
        priority,
    }))
}

/// List the recognised table files in `dir`, sorted by file name.
pub fn list_sources(dir: &Path, config: &TableConfig) -> Result<Vec<SourceFile>, TableError> {
    let meta = fs::metadata(dir).map_err(|e| TableError::io(dir, e))?;
    if !meta.is_dir() {
        return Err(TableError::NotADirectory(dir.to_path_buf()));
    }

    let mut sources = Vec::new();
    for item in fs::read_dir(dir).map_err(|e| TableError::io(dir, e))? {
        let item = item.map_err(|e| TableError::io(dir, e))?;
        let path = item.path();
        if !config.is_table_file(&path) {
            continue;
        }
        // follows symlinks, unlike DirEntry::metadata
        let meta = fs::metadata(&path).map_err(|e| TableError::io(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().map_err(|e| TableError::io(&path, e))?;
        let name = item.file_name().to_string_lossy().into_owned();
        sources.push(SourceFile {
            name,
            path,
            modified,
        });
    }

    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}

/// Read one table file. Entries get consecutive `seq` values starting at
/// `seq_start`. Returns the entries and the number of skipped lines.
pub fn read_table_file(
    path: &Path,
    source_name: &str,
    config: &TableConfig,
    seq_start: usize,
) -> Result<(Vec<Entry>, usize), TableError> {
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    let mut skipped = 0;
    for (idx, line) in reader.lines().enumerate() {
        let raw = line.map_err(|e| TableError::io(path, e))?;
        let line = if idx == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw.as_str()
        };

        match parse_line(line, config) {
            Ok(Some(parsed)) => {
                let entry = Entry::new(source_name, parsed.code, parsed.word)
                    .boosted(parsed.boosted)
                    .with_priority(parsed.priority)
                    .with_seq(seq_start + entries.len());
                entries.push(entry);
            }
            Ok(None) => {}
            Err(err) => {
                skipped += 1;
                warn!(
                    file = source_name,
                    line = idx + 1,
                    error = %err,
                    "skipping unrecognised table line: {:?}",
                    line.trim()
                );
            }
        }
    }

    debug!(
        file = source_name,
        entries = entries.len(),
        skipped,
        "read table file"
    );
    Ok((entries, skipped))
}

/// Load every recognised file in `dir`.
pub fn load_dir(dir: &Path, config: &TableConfig) -> Result<LoadedTable, TableError> {
    let started_at = SystemTime::now();
    let sources = list_sources(dir, config)?;

    let mut entries = Vec::new();
    let mut report = LoadReport {
        files: sources.len(),
        ..LoadReport::default()
    };
    for source in &sources {
        let (mut file_entries, skipped) =
            read_table_file(&source.path, &source.name, config, entries.len())?;
        report.skipped += skipped;
        entries.append(&mut file_entries);
    }
    report.entries = entries.len();

    Ok(LoadedTable {
        entries,
        sources,
        report,
        started_at,
    })
}
