//! Persistent per-symbol storage for cached historical series.
//!
//! A store only keeps what it is given. Merging is the coordinator's job;
//! `put` replaces the whole series for a symbol in one step.

mod memory;
mod sqlite;

pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

use crate::series::SymbolSeries;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
    /// A row cannot be represented in, or was read back out of range from, the store.
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Mapping from upper-case symbol to its cached [`SymbolSeries`].
pub trait CoverageStore: Send + Sync {
    /// Looks up the series for `symbol`. No network I/O.
    fn get(&self, symbol: &str) -> Result<Option<SymbolSeries>, StoreError>;

    /// Replaces the series for `symbol`. Either the whole series is written
    /// or the previous state is kept.
    fn put(&self, symbol: &str, series: &SymbolSeries) -> Result<(), StoreError>;

    /// Symbols with a cached series, sorted.
    fn symbols(&self) -> Result<Vec<String>, StoreError>;

    /// Drops the cached series for `symbol`. Returns whether one existed.
    fn remove(&self, symbol: &str) -> Result<bool, StoreError>;
}

pub(crate) fn canonical_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
