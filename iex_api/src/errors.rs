//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, redirect loop, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API answered with the `Unknown symbol` sentinel body.
    #[error("Unknown symbol")]
    UnknownSymbol,
    /// The body decoded to empty JSON (`{}`, `[]`, `null` or `""`).
    #[error("Empty response")]
    EmptyResponse,
    /// The body is malformed or flagged with an error message.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Every attempt allowed by the retry policy failed.
    #[error("Query failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },
}

impl Error {
    /// Transport failures and non-success statuses are worth another attempt.
    /// Validation failures are deterministic and are returned immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RequestFailed | Error::HttpStatus { .. })
    }
}
