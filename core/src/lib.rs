//! libcodetable-core
//!
//! Code table loading, ranked code matching and the keystroke decoder shared
//! by shape-code input methods (libxingma).
//!
//! A code table is a directory of tab-separated text files mapping short
//! alphabetic codes (at most four letters) to words. The table is loaded into
//! an immutable generation that is rebuilt wholesale whenever a source file
//! changes.
//!
//! Public API:
//! - `Entry` - One table row with its ranking key
//! - `CodeTable` - One immutable generation with rank and word views
//! - `TableStore` - Auto-refreshing handle over a table directory
//! - `Key` / `SelectKey` - Keystroke token vocabulary
//! - `Decoder` / `decode` - Keystroke stream transducer
//! - `TableConfig` - Loader and refresh settings

pub mod config;
pub use config::TableConfig;

pub mod entry;
pub use entry::{is_valid_code, Entry, MAX_CODE_LEN};

pub mod error;
pub use error::{ConfigError, LineError, TableError};

pub mod keys;
pub use keys::{parse_tokens, Key, SelectKey, SIGN_KEYS};

pub mod loader;
pub use loader::{load_dir, parse_line, LoadReport, LoadedTable, ParsedLine, SourceFile};

pub mod table;
pub use table::{CodeTable, TableStats};

pub mod store;
pub use store::TableStore;

pub mod decoder;
pub use decoder::{decode, Decode, Decoded, Decoder, TableSource};

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

}
