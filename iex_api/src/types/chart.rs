//! Chart endpoint payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily bar as returned by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    /// Trading day, `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    #[serde(default)]
    pub unadjusted_volume: Option<u64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub vwap: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub change_over_time: Option<f64>,
}

/// Daily bar returned when `chartCloseOnly=true`: only the close and volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// Per-symbol section of a batch response. Only the chart type is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry<B = ChartBar> {
    #[serde(default = "Vec::new")]
    pub chart: Vec<B>,
}

/// Batch responses are keyed by upper-case symbol.
pub type BatchResponse<B = ChartBar> = BTreeMap<String, BatchEntry<B>>;
