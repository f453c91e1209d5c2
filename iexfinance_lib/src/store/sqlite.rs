//! SQLite-backed coverage store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{canonical_symbol, CoverageStore, StoreError};
use crate::series::{SymbolSeries, TimeSeriesRow};

const SCHEMA_VERSION: i32 = 1;
const DATE_FORMAT: &str = "%Y-%m-%d";

type RawRow = (String, f64, f64, f64, f64, i64);

/// File-backed coverage store. One row table plus one metadata record per symbol.
///
/// The connection sits behind a mutex, so a `put` and a later `get` never
/// observe each other half way.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Number of cached rows for `symbol`.
    pub fn row_count(&self, symbol: &str) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM series_rows WHERE symbol = ?1",
            params![canonical_symbol(symbol)],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl CoverageStore for SqliteStore {
    fn get(&self, symbol: &str) -> Result<Option<SymbolSeries>, StoreError> {
        let symbol = canonical_symbol(symbol);
        let conn = self.lock()?;

        let meta: Option<(String, String)> = conn
            .query_row(
                "SELECT min_date, max_date FROM series_meta WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((min_date, max_date)) = meta else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT date, open, high, low, close, volume
             FROM series_rows
             WHERE symbol = ?1
             ORDER BY date",
        )?;
        let raw: Vec<RawRow> = stmt
            .query_map(params![symbol], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<_, _>>()?;

        let rows = raw
            .into_iter()
            .map(|(date, open, high, low, close, volume)| {
                let volume = u64::try_from(volume).map_err(|_| {
                    StoreError::InvalidRow(format!(
                        "{} {}: negative volume {}",
                        symbol, date, volume
                    ))
                })?;
                Ok(TimeSeriesRow {
                    date: NaiveDate::parse_from_str(&date, DATE_FORMAT)?,
                    open,
                    high,
                    low,
                    close,
                    volume,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Some(SymbolSeries {
            rows,
            min_date: NaiveDate::parse_from_str(&min_date, DATE_FORMAT)?,
            max_date: NaiveDate::parse_from_str(&max_date, DATE_FORMAT)?,
        }))
    }

    fn put(&self, symbol: &str, series: &SymbolSeries) -> Result<(), StoreError> {
        let symbol = canonical_symbol(symbol);
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO series_meta (symbol, min_date, max_date, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(symbol) DO UPDATE SET
                min_date = excluded.min_date,
                max_date = excluded.max_date,
                updated_at = excluded.updated_at",
            params![
                symbol,
                series.min_date.format(DATE_FORMAT).to_string(),
                series.max_date.format(DATE_FORMAT).to_string(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        tx.execute(
            "DELETE FROM series_rows WHERE symbol = ?1",
            params![symbol],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO series_rows (symbol, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in &series.rows {
                let volume = i64::try_from(row.volume).map_err(|_| {
                    StoreError::InvalidRow(format!(
                        "{} {}: volume {} exceeds the storable range",
                        symbol, row.date, row.volume
                    ))
                })?;
                stmt.execute(params![
                    symbol,
                    row.date.format(DATE_FORMAT).to_string(),
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    volume,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT symbol FROM series_meta ORDER BY symbol")?;
        let symbols = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(symbols)
    }

    fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM series_meta WHERE symbol = ?1",
            params![canonical_symbol(symbol)],
        )?;
        Ok(deleted > 0)
    }
}
