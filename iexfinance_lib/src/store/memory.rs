//! In-memory coverage store backed by `DashMap` for concurrent access.

use dashmap::DashMap;

use super::{canonical_symbol, CoverageStore, StoreError};
use crate::series::SymbolSeries;

/// Thread-safe coverage store that lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    store: DashMap<String, SymbolSeries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl CoverageStore for MemoryStore {
    fn get(&self, symbol: &str) -> Result<Option<SymbolSeries>, StoreError> {
        Ok(self
            .store
            .get(&canonical_symbol(symbol))
            .map(|entry| entry.value().clone()))
    }

    fn put(&self, symbol: &str, series: &SymbolSeries) -> Result<(), StoreError> {
        self.store.insert(canonical_symbol(symbol), series.clone());
        Ok(())
    }

    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut symbols: Vec<String> = self.store.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        Ok(symbols)
    }

    fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        Ok(self.store.remove(&canonical_symbol(symbol)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(day: u32) -> SymbolSeries {
        let date = NaiveDate::from_ymd_opt(2017, 1, day).unwrap();
        SymbolSeries::new(vec![], date, date)
    }

    #[test]
    fn store_put_and_get() {
        let store = MemoryStore::new();
        store.put("aapl", &series(3)).unwrap();
        assert_eq!(store.get("AAPL").unwrap(), Some(series(3)));
        assert_eq!(store.get("aapl").unwrap(), Some(series(3)));
    }

    #[test]
    fn store_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn store_overwrite() {
        let store = MemoryStore::new();
        store.put("AAPL", &series(3)).unwrap();
        store.put("AAPL", &series(4)).unwrap();
        assert_eq!(store.get("AAPL").unwrap(), Some(series(4)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_symbols_and_remove() {
        let store = MemoryStore::new();
        store.put("msft", &series(3)).unwrap();
        store.put("aapl", &series(3)).unwrap();
        assert_eq!(store.symbols().unwrap(), vec!["AAPL", "MSFT"]);
        assert!(store.remove("Msft").unwrap());
        assert!(!store.remove("MSFT").unwrap());
        assert_eq!(store.symbols().unwrap(), vec!["AAPL"]);
    }
}
