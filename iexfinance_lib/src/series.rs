//! Daily OHLCV rows and the per-symbol cached series.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use iex_api::types::{ChartBar, CloseBar};

use crate::error::IexFinanceError;

/// One trading day for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&ChartBar> for TimeSeriesRow {
    fn from(bar: &ChartBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Close and volume for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

impl From<&TimeSeriesRow> for CloseRow {
    fn from(row: &TimeSeriesRow) -> Self {
        Self {
            date: row.date,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl From<&CloseBar> for CloseRow {
    fn from(bar: &CloseBar) -> Self {
        Self {
            date: bar.date,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Narrows full rows to close and volume.
pub fn close_only(rows: &[TimeSeriesRow]) -> Vec<CloseRow> {
    rows.iter().map(CloseRow::from).collect()
}

/// Rows keyed by trading day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for TimeSeriesRow {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for CloseRow {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Cached rows for one symbol plus the date range they are known to cover.
///
/// Rows are sorted by date with no duplicates, and every row lies inside
/// `[min_date, max_date]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    pub rows: Vec<TimeSeriesRow>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl SymbolSeries {
    /// Creates a series covering `[min_date, max_date]`. Rows are normalized
    /// (sorted, first occurrence of each date kept).
    pub fn new(rows: Vec<TimeSeriesRow>, min_date: NaiveDate, max_date: NaiveDate) -> Self {
        Self {
            rows: dedup_keep_first(rows),
            min_date,
            max_date,
        }
    }

    /// Appends `incoming` after the existing rows and drops duplicate dates,
    /// keeping the first occurrence so already-cached rows win.
    pub fn merge(&mut self, incoming: Vec<TimeSeriesRow>) {
        let mut combined = std::mem::take(&mut self.rows);
        combined.extend(incoming);
        self.rows = dedup_keep_first(combined);
    }

    /// Rows with `start <= date <= end`.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Vec<TimeSeriesRow> {
        slice_rows(&self.rows, start, end)
    }

    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.min_date <= start && end <= self.max_date
    }

    /// Verifies the ordering, uniqueness, and coverage invariants.
    pub fn check_consistency(&self) -> Result<(), IexFinanceError> {
        if self.min_date > self.max_date {
            return Err(IexFinanceError::CacheConsistency(format!(
                "min_date {} is after max_date {}",
                self.min_date, self.max_date
            )));
        }
        for pair in self.rows.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(IexFinanceError::CacheConsistency(format!(
                    "rows out of order or duplicated at {}",
                    pair[1].date
                )));
            }
        }
        if let Some(row) = self
            .rows
            .iter()
            .find(|r| r.date < self.min_date || r.date > self.max_date)
        {
            return Err(IexFinanceError::CacheConsistency(format!(
                "row {} lies outside coverage [{}, {}]",
                row.date, self.min_date, self.max_date
            )));
        }
        Ok(())
    }
}

pub(crate) fn slice_rows<R: Dated + Clone>(rows: &[R], start: NaiveDate, end: NaiveDate) -> Vec<R> {
    rows.iter()
        .filter(|r| r.date() >= start && r.date() <= end)
        .cloned()
        .collect()
}

/// Sorts by date, keeping the first-seen row for each date.
pub(crate) fn dedup_keep_first<R: Dated>(rows: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut unique: Vec<R> = rows
        .into_iter()
        .filter(|r| seen.insert(r.date()))
        .collect();
    // Stable sort; dates are unique at this point.
    unique.sort_by_key(|r| r.date());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: NaiveDate, close: f64) -> TimeSeriesRow {
        TimeSeriesRow {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn merge_keeps_cached_row_on_overlap() {
        let mut series = SymbolSeries::new(
            vec![row(d(2017, 1, 3), 1.0), row(d(2017, 1, 4), 2.0)],
            d(2017, 1, 3),
            d(2017, 1, 4),
        );
        series.merge(vec![row(d(2017, 1, 4), 99.0), row(d(2017, 1, 5), 3.0)]);
        series.max_date = d(2017, 1, 5);

        assert_eq!(series.rows.len(), 3);
        assert_eq!(series.rows[1].close, 2.0);
        assert_eq!(series.rows[2].date, d(2017, 1, 5));
        assert!(series.check_consistency().is_ok());
    }

    #[test]
    fn merge_sorts_prepended_rows() {
        let mut series = SymbolSeries::new(vec![row(d(2017, 1, 10), 5.0)], d(2017, 1, 10), d(2017, 1, 10));
        series.merge(vec![row(d(2017, 1, 9), 4.0), row(d(2017, 1, 10), 0.0)]);
        let dates: Vec<_> = series.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2017, 1, 9), d(2017, 1, 10)]);
        assert_eq!(series.rows[1].close, 5.0);
    }

    #[test]
    fn slice_is_inclusive() {
        let series = SymbolSeries::new(
            vec![
                row(d(2017, 1, 3), 1.0),
                row(d(2017, 1, 4), 2.0),
                row(d(2017, 1, 5), 3.0),
            ],
            d(2017, 1, 3),
            d(2017, 1, 5),
        );
        let slice = series.slice(d(2017, 1, 4), d(2017, 1, 5));
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].date, d(2017, 1, 4));
        assert!(series.slice(d(2018, 1, 1), d(2018, 2, 1)).is_empty());
    }

    #[test]
    fn consistency_rejects_rows_outside_coverage() {
        let series = SymbolSeries {
            rows: vec![row(d(2017, 2, 1), 1.0)],
            min_date: d(2017, 1, 1),
            max_date: d(2017, 1, 31),
        };
        assert!(matches!(
            series.check_consistency(),
            Err(IexFinanceError::CacheConsistency(_))
        ));
    }

    #[test]
    fn consistency_rejects_duplicates() {
        let series = SymbolSeries {
            rows: vec![row(d(2017, 1, 3), 1.0), row(d(2017, 1, 3), 2.0)],
            min_date: d(2017, 1, 1),
            max_date: d(2017, 1, 31),
        };
        assert!(series.check_consistency().is_err());
    }

    #[test]
    fn covers_checks_both_bounds() {
        let series = SymbolSeries::new(vec![], d(2017, 1, 1), d(2017, 6, 1));
        assert!(series.covers(d(2017, 2, 1), d(2017, 5, 1)));
        assert!(!series.covers(d(2016, 12, 31), d(2017, 5, 1)));
        assert!(!series.covers(d(2017, 2, 1), d(2017, 6, 2)));
    }

    #[test]
    fn row_from_chart_bar() {
        let bar: ChartBar = serde_json::from_str(
            r#"{"date": "2017-02-09", "open": 831.73, "high": 831.98, "low": 818.0, "close": 821.36, "volume": 3573917}"#,
        )
        .unwrap();
        let row = TimeSeriesRow::from(&bar);
        assert_eq!(row.date, d(2017, 2, 9));
        assert_eq!(row.close, 821.36);
        assert_eq!(row.volume, 3573917);
    }

    #[test]
    fn close_only_keeps_close_and_volume() {
        let mut full = row(d(2017, 2, 9), 821.36);
        full.volume = 3573917;
        let closes = close_only(&[full]);
        assert_eq!(
            closes,
            vec![CloseRow {
                date: d(2017, 2, 9),
                close: 821.36,
                volume: 3573917,
            }]
        );
    }

    #[test]
    fn close_rows_dedup_and_slice_by_date() {
        let close = |date, close| CloseRow {
            date,
            close,
            volume: 1,
        };
        let rows = dedup_keep_first(vec![
            close(d(2017, 1, 4), 2.0),
            close(d(2017, 1, 3), 1.0),
            close(d(2017, 1, 4), 9.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].close, 2.0);
        assert_eq!(slice_rows(&rows, d(2017, 1, 4), d(2017, 1, 4)).len(), 1);
    }
}
