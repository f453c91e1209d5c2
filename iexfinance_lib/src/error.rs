//! Error types for the library layer.

use crate::store::StoreError;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding cache, date-range, and input validation failures.
#[derive(thiserror::Error, Debug)]
pub enum IexFinanceError {
    /// The remote call ultimately failed.
    #[error("Query failed: {0}")]
    Query(iex_api::Error),
    /// The service did not recognise the symbol, or left it out of a batch response.
    #[error("Symbol {0} not found")]
    SymbolNotFound(String),
    /// The requested dates cannot be served by the chart endpoint.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    /// A merge broke the one-row-per-date or coverage invariant.
    #[error("Cache consistency violated: {0}")]
    CacheConsistency(String),
    /// The coverage store failed to read or write.
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
    /// User-provided input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The caller cancelled a batch request.
    #[error("Request cancelled")]
    Cancelled,
}

impl From<iex_api::Error> for IexFinanceError {
    fn from(e: iex_api::Error) -> Self {
        Self::Query(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = IexFinanceError::SymbolNotFound("ZZZZ".to_string());
        assert_eq!(err.to_string(), "Symbol ZZZZ not found");

        let err = IexFinanceError::from(iex_api::Error::RequestFailed);
        assert!(err.to_string().contains("Query failed"));

        let err = IexFinanceError::InvalidDateRange("start after end".to_string());
        assert!(err.to_string().contains("start after end"));
    }
}
