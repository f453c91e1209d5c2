//! Library layer for iexfinance: incremental historical cache, coverage
//! stores, configuration, and input validation.
//!
//! Wraps the `iex_api` crate with a gap-filling cache over a pluggable
//! [`CoverageStore`] (in-memory or SQLite).

pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod historical;
pub mod series;
pub mod store;
pub mod validation;

pub use iex_api;
pub use iex_api::types;
pub use iex_api::{
    Client, ClientConfig, CryptoEndpoint, MoverList, QuotaType, Resource, RetryPolicy,
};

pub use config::Config;
pub use coordinator::{CacheCoordinator, CacheRequest};
pub use error::IexFinanceError;
pub use historical::{chart_range, ChartFetcher, HistoricalSource};
pub use series::{CloseRow, SymbolSeries, TimeSeriesRow};
pub use store::{CoverageStore, MemoryStore, SqliteStore, StoreError};
