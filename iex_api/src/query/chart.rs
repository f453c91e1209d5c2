//! Query builder for the batch chart (historical prices) endpoint.

use crate::types::ChartRange;

use super::{Query, QueryParams};

/// Path of the batch endpoint that serves chart data for one or more symbols.
pub const BATCH_PATH: &str = "stock/market/batch";

/// Chart request for a set of symbols over a coarse lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartQuery {
    pub symbols: Vec<String>,
    pub range: ChartRange,
    /// Sends `chartCloseOnly=true`, which trims each bar to close and volume.
    pub close_only: bool,
}

impl ChartQuery {
    pub fn new(range: ChartRange) -> Self {
        Self {
            symbols: Vec::new(),
            range,
            close_only: false,
        }
    }

    /// Adds a symbol, upper-cased.
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbols.push(symbol.to_uppercase());
        self
    }

    pub fn with_symbols(mut self, symbols: &[&str]) -> Self {
        self.symbols.extend(symbols.iter().map(|s| s.to_uppercase()));
        self
    }

    pub fn with_close_only(mut self, close_only: bool) -> Self {
        self.close_only = close_only;
        self
    }

    pub fn path(&self) -> &'static str {
        BATCH_PATH
    }
}

impl Query for ChartQuery {
    fn params(&self) -> QueryParams {
        QueryParams::new()
            .with("symbols", self.symbols.join(","))
            .with("types", "chart")
            .with("range", self.range.to_string())
            .with("chartCloseOnly", self.close_only)
    }
}
