//! Historical price fetching from the chart endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};

use iex_api::types::{BatchResponse, ChartRange};
use iex_api::{ChartQuery, Client};

use crate::error::IexFinanceError;
use crate::series::{close_only, dedup_keep_first, slice_rows, CloseRow, TimeSeriesRow};

/// Oldest lookback, in whole years, the chart endpoint serves.
pub const MAX_LOOKBACK_YEARS: i32 = 5;

/// Source of daily rows for one symbol over an inclusive date range.
///
/// Implementations return rows sorted by date with unique dates, all inside
/// `[start, end]`.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesRow>, IexFinanceError>;

    /// Close and volume only, under the same contract as `fetch_range`.
    /// The default narrows full rows.
    async fn fetch_close_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CloseRow>, IexFinanceError> {
        let rows = self.fetch_range(symbol, start, end).await?;
        Ok(close_only(&rows))
    }
}

/// Number of whole years from `start` to `today`. Negative when `start`
/// is in the future.
pub fn whole_years_between(start: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - start.year();
    if (today.month(), today.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}

/// Picks how much history to request so that `start` is included.
///
/// 0 whole years back → `1y`, 1 → `2y`, 2 through 5 → `5y`. Anything older,
/// or a start date after `today`, is rejected.
pub fn chart_range(start: NaiveDate, today: NaiveDate) -> Result<ChartRange, IexFinanceError> {
    if start > today {
        return Err(IexFinanceError::InvalidDateRange(format!(
            "start date {} is in the future",
            start
        )));
    }
    match whole_years_between(start, today) {
        0 => Ok(ChartRange::OneYear),
        1 => Ok(ChartRange::TwoYears),
        2..=MAX_LOOKBACK_YEARS => Ok(ChartRange::FiveYears),
        _ => Err(IexFinanceError::InvalidDateRange(format!(
            "start date {} is more than {} years before {}",
            start, MAX_LOOKBACK_YEARS, today
        ))),
    }
}

/// [`HistoricalSource`] backed by the batch chart endpoint.
pub struct ChartFetcher {
    client: Arc<Client>,
    reference_date: Option<NaiveDate>,
}

impl ChartFetcher {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            reference_date: None,
        }
    }

    /// Pins the date chart ranges are measured from. Defaults to today (UTC).
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Validates the range and builds the single-symbol chart query for it.
    fn plan(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(String, ChartQuery), IexFinanceError> {
        if start > end {
            return Err(IexFinanceError::InvalidDateRange(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        let symbol = symbol.to_uppercase();
        let range = chart_range(start, self.today())?;
        tracing::info!(
            "{}: requesting {} chart to cover {} to {}",
            symbol,
            range,
            start,
            end
        );
        let query = ChartQuery::new(range).with_symbol(&symbol);
        Ok((symbol, query))
    }
}

/// The service answers a batch naming only unknown symbols with `{}`, so an
/// empty body means the symbol is absent, as does the sentinel.
fn query_error(symbol: &str, err: iex_api::Error) -> IexFinanceError {
    match err {
        iex_api::Error::UnknownSymbol | iex_api::Error::EmptyResponse => {
            IexFinanceError::SymbolNotFound(symbol.to_string())
        }
        other => IexFinanceError::Query(other),
    }
}

fn symbol_bars<B>(resp: BatchResponse<B>, symbol: &str) -> Result<Vec<B>, IexFinanceError> {
    resp.into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(symbol))
        .map(|(_, entry)| entry.chart)
        .ok_or_else(|| IexFinanceError::SymbolNotFound(symbol.to_string()))
}

#[async_trait]
impl HistoricalSource for ChartFetcher {
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesRow>, IexFinanceError> {
        let (symbol, query) = self.plan(symbol, start, end)?;
        let resp = self
            .client
            .get_chart(&query)
            .await
            .map_err(|e| query_error(&symbol, e))?;

        let bars = symbol_bars(resp, &symbol)?;
        let rows: Vec<TimeSeriesRow> = bars.iter().map(TimeSeriesRow::from).collect();
        let rows = dedup_keep_first(rows);
        let rows = slice_rows(&rows, start, end);
        tracing::debug!("{}: {} rows within {} to {}", symbol, rows.len(), start, end);
        Ok(rows)
    }

    /// Requests `chartCloseOnly=true` so the service trims the bars itself.
    async fn fetch_close_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CloseRow>, IexFinanceError> {
        let (symbol, query) = self.plan(symbol, start, end)?;
        let resp = self
            .client
            .get_close_chart(&query)
            .await
            .map_err(|e| query_error(&symbol, e))?;

        let bars = symbol_bars(resp, &symbol)?;
        let rows: Vec<CloseRow> = bars.iter().map(CloseRow::from).collect();
        let rows = dedup_keep_first(rows);
        let rows = slice_rows(&rows, start, end);
        tracing::debug!("{}: {} close rows within {} to {}", symbol, rows.len(), start, end);
        Ok(rows)
    }
}
