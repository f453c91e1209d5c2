//! Incremental historical cache: serves date ranges from the coverage store
//! and fetches only the missing edges.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use crate::error::IexFinanceError;
use crate::historical::HistoricalSource;
use crate::series::{close_only, CloseRow, SymbolSeries, TimeSeriesRow};
use crate::store::{canonical_symbol, CoverageStore};

type ProgressHook = Box<dyn Fn(&str) + Send + Sync>;
type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// A single symbol's inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheRequest {
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, IexFinanceError> {
        if start > end {
            return Err(IexFinanceError::InvalidDateRange(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self {
            symbol: canonical_symbol(symbol),
            start,
            end,
        })
    }
}

/// Portion of a request that lies outside the cached coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    Before(NaiveDate, NaiveDate),
    After(NaiveDate, NaiveDate),
}

impl Gap {
    fn bounds(self) -> (NaiveDate, NaiveDate) {
        match self {
            Gap::Before(start, end) | Gap::After(start, end) => (start, end),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Gap::Before(..) => "before",
            Gap::After(..) => "after",
        }
    }
}

/// Held for the duration of one symbol's request. On release the symbol's
/// map entry is dropped unless another caller holds or awaits it.
struct SymbolLock<'a> {
    locks: &'a LockMap,
    symbol: &'a str,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SymbolLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(self.symbol, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Serves historical requests through a [`CoverageStore`], extending each
/// symbol's coverage with at most two gap fetches per request.
///
/// Requests for the same symbol are serialized from lookup through write.
/// Different symbols never block each other. Lock entries exist only while
/// a request for the symbol is in flight.
pub struct CacheCoordinator {
    source: Arc<dyn HistoricalSource>,
    store: Arc<dyn CoverageStore>,
    locks: LockMap,
    progress: Option<ProgressHook>,
}

impl CacheCoordinator {
    pub fn new(source: Arc<dyn HistoricalSource>, store: Arc<dyn CoverageStore>) -> Self {
        Self {
            source,
            store,
            locks: DashMap::new(),
            progress: None,
        }
    }

    /// Calls `hook` with each symbol once a batch finishes with it, whether it
    /// was returned or skipped.
    pub fn with_progress<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(hook));
        self
    }

    pub fn store(&self) -> &Arc<dyn CoverageStore> {
        &self.store
    }

    async fn lock_symbol<'a>(&'a self, symbol: &'a str) -> SymbolLock<'a> {
        let lock = self
            .locks
            .entry(symbol.to_string())
            .or_default()
            .value()
            .clone();
        SymbolLock {
            locks: &self.locks,
            symbol,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Returns the rows for `request`, fetching only what the store does not
    /// already cover. The store is written only after every fetch succeeded.
    pub async fn get_range(
        &self,
        request: &CacheRequest,
    ) -> Result<Vec<TimeSeriesRow>, IexFinanceError> {
        let symbol = request.symbol.as_str();
        let _lock = self.lock_symbol(symbol).await;

        let Some(cached) = self.store.get(symbol)? else {
            tracing::info!(
                "{}: not cached, fetching {} to {}",
                symbol,
                request.start,
                request.end
            );
            let rows = self
                .source
                .fetch_range(symbol, request.start, request.end)
                .await?;
            let series = SymbolSeries::new(rows, request.start, request.end);
            self.persist(symbol, &series)?;
            return Ok(series.rows);
        };

        if cached.covers(request.start, request.end) {
            tracing::info!(
                "{}: cache hit for {} to {}",
                symbol,
                request.start,
                request.end
            );
            return Ok(cached.slice(request.start, request.end));
        }

        let before = (request.start < cached.min_date)
            .then_some(Gap::Before(request.start, cached.min_date));
        let after =
            (request.end > cached.max_date).then_some(Gap::After(cached.max_date, request.end));

        let (before_rows, after_rows) = tokio::try_join!(
            self.fetch_gap(symbol, before),
            self.fetch_gap(symbol, after)
        )?;

        let mut series = cached;
        series.merge(before_rows);
        series.merge(after_rows);
        series.min_date = series.min_date.min(request.start);
        series.max_date = series.max_date.max(request.end);
        self.persist(symbol, &series)?;

        Ok(series.slice(request.start, request.end))
    }

    async fn fetch_gap(
        &self,
        symbol: &str,
        gap: Option<Gap>,
    ) -> Result<Vec<TimeSeriesRow>, IexFinanceError> {
        let Some(gap) = gap else {
            return Ok(Vec::new());
        };
        let (start, end) = gap.bounds();
        tracing::info!(
            "{}: filling {} gap {} to {}",
            symbol,
            gap.label(),
            start,
            end
        );
        self.source.fetch_range(symbol, start, end).await
    }

    fn persist(&self, symbol: &str, series: &SymbolSeries) -> Result<(), IexFinanceError> {
        if let Err(err) = series.check_consistency() {
            tracing::error!("{}: refusing to store series: {}", symbol, err);
            return Err(err);
        }
        self.store.put(symbol, series)?;
        tracing::debug!(
            "{}: stored {} rows covering {} to {}",
            symbol,
            series.rows.len(),
            series.min_date,
            series.max_date
        );
        Ok(())
    }

    async fn get_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        use_cache: bool,
    ) -> Result<Vec<TimeSeriesRow>, IexFinanceError> {
        let request = CacheRequest::new(symbol, start, end)?;
        if use_cache {
            self.get_range(&request).await
        } else {
            self.source
                .fetch_range(&request.symbol, request.start, request.end)
                .await
        }
    }

    /// Fetches `[start, end]` for each symbol in turn.
    ///
    /// With more than one symbol, symbols the service does not know are
    /// logged and left out of the result. Any other error aborts the batch.
    pub async fn get_historical<S: AsRef<str>>(
        &self,
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
        use_cache: bool,
    ) -> Result<BTreeMap<String, Vec<TimeSeriesRow>>, IexFinanceError> {
        let never = CancellationToken::new();
        self.get_historical_cancellable(symbols, start, end, use_cache, &never)
            .await
    }

    /// Like [`CacheCoordinator::get_historical`], but stops with
    /// [`IexFinanceError::Cancelled`] once `cancel` fires. Symbols already
    /// written to the store stay written.
    pub async fn get_historical_cancellable<S: AsRef<str>>(
        &self,
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
        use_cache: bool,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, Vec<TimeSeriesRow>>, IexFinanceError> {
        self.run_batch(symbols, start, end, cancel, |symbol| async move {
            self.get_symbol(&symbol, start, end, use_cache).await
        })
        .await
    }

    /// Close and volume for each symbol, with the batch rules of
    /// [`CacheCoordinator::get_historical_cancellable`].
    ///
    /// Cached requests still fetch and store full rows and are narrowed on
    /// the way out. Uncached requests ask the source for closes directly.
    pub async fn get_closes_cancellable<S: AsRef<str>>(
        &self,
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
        use_cache: bool,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, Vec<CloseRow>>, IexFinanceError> {
        self.run_batch(symbols, start, end, cancel, |symbol| async move {
            let request = CacheRequest::new(&symbol, start, end)?;
            if use_cache {
                Ok(close_only(&self.get_range(&request).await?))
            } else {
                self.source
                    .fetch_close_range(&request.symbol, request.start, request.end)
                    .await
            }
        })
        .await
    }

    async fn run_batch<S, T, F, Fut>(
        &self,
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<BTreeMap<String, T>, IexFinanceError>
    where
        S: AsRef<str>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, IexFinanceError>>,
    {
        if start > end {
            return Err(IexFinanceError::InvalidDateRange(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        let batch = symbols.len() > 1;
        let mut out = BTreeMap::new();

        for symbol in symbols {
            let symbol = canonical_symbol(symbol.as_ref());
            if cancel.is_cancelled() {
                tracing::warn!("Batch cancelled before {}", symbol);
                return Err(IexFinanceError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!("Batch cancelled while fetching {}", symbol);
                    return Err(IexFinanceError::Cancelled);
                }
                result = fetch(symbol.clone()) => result,
            };

            match result {
                Ok(rows) => {
                    out.insert(symbol.clone(), rows);
                }
                Err(IexFinanceError::SymbolNotFound(missing)) if batch => {
                    tracing::warn!("Skipping {}: symbol not found", missing);
                }
                Err(err) => return Err(err),
            }
            if let Some(hook) = &self.progress {
                hook(&symbol);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::time::Duration;

    struct SlowEmptySource;

    #[async_trait]
    impl HistoricalSource for SlowEmptySource {
        async fn fetch_range(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<TimeSeriesRow>, IexFinanceError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Vec::new())
        }
    }

    fn coordinator() -> CacheCoordinator {
        CacheCoordinator::new(Arc::new(SlowEmptySource), Arc::new(MemoryStore::new()))
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn request_uppercases_symbol() {
        let req = CacheRequest::new(" amzn ", d(2017, 1, 1), d(2017, 2, 1)).unwrap();
        assert_eq!(req.symbol, "AMZN");
    }

    #[test]
    fn request_rejects_inverted_range() {
        let err = CacheRequest::new("AMZN", d(2017, 2, 1), d(2017, 1, 1)).unwrap_err();
        assert!(matches!(err, IexFinanceError::InvalidDateRange(_)));
    }

    #[test]
    fn single_day_request_is_valid() {
        assert!(CacheRequest::new("AMZN", d(2017, 2, 1), d(2017, 2, 1)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn lock_entries_dropped_after_batch() {
        let coordinator = coordinator();
        coordinator
            .get_historical(&["AAPL", "MSFT", "AMZN"], d(2017, 1, 3), d(2017, 1, 31), true)
            .await
            .unwrap();
        assert!(coordinator.locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lock_entry_kept_while_another_caller_waits() {
        let coordinator = coordinator();
        let request = CacheRequest::new("AAPL", d(2017, 1, 3), d(2017, 1, 31)).unwrap();

        let held = coordinator.lock_symbol("AAPL").await;
        let waiter = coordinator.get_range(&request);
        tokio::pin!(waiter);
        assert!(poll_once(waiter.as_mut()).await.is_none());
        assert_eq!(coordinator.locks.len(), 1);

        drop(held);
        assert_eq!(coordinator.locks.len(), 1);
        waiter.await.unwrap();
        assert!(coordinator.locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_waiter_does_not_leak_entry() {
        let coordinator = coordinator();
        let request = CacheRequest::new("AAPL", d(2017, 1, 3), d(2017, 1, 31)).unwrap();
        {
            let _held = coordinator.lock_symbol("AAPL").await;
            let waiter = coordinator.get_range(&request);
            tokio::pin!(waiter);
            assert!(poll_once(waiter.as_mut()).await.is_none());
        }
        assert!(coordinator.locks.is_empty());
        coordinator.get_range(&request).await.unwrap();
        assert!(coordinator.locks.is_empty());
    }

    async fn poll_once<F: Future + Unpin>(fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            out = fut => Some(out),
            _ = std::future::ready(()) => None,
        }
    }
}
