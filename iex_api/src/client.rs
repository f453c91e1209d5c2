//! HTTP client and query executor for the IEX API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    query::{ChartQuery, Query, Resource},
    types::{BatchResponse, CloseBar},
    Error, RetryPolicy,
};

/// IEX Cloud production endpoint.
pub const IEX_CLOUD_URL: &str = "https://cloud.iexapis.com/stable";
/// IEX legacy Developer API 1.0 endpoint.
pub const IEX_LEGACY_URL: &str = "https://api.iextrading.com/1.0";

/// Body the service sends instead of JSON when it does not recognise a symbol.
const UNKNOWN_SYMBOL_BODY: &str = "Unknown symbol";

/// Settings for [`Client`]. All values are opaque to the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Appended to every request as `token=<value>` when set.
    pub token: Option<String>,
    pub retry: RetryPolicy,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: IEX_CLOUD_URL.to_string(),
            token: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the IEX API.
///
/// Wraps a single pooled `reqwest::Client`. Every call goes through
/// [`Client::execute`], which applies the configured [`RetryPolicy`] and
/// validates the decoded body.
pub struct Client {
    http: reqwest::Client,
    base_api_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a new client pointing at IEX Cloud with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(ClientConfig::default())
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::from_config(ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_api_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            retry: config.retry,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Builds the full request URL for `path` with the query's parameters
    /// and, if configured, the token.
    pub fn get_url<Q: Query + ?Sized>(&self, path: &str, query: &Q) -> Result<Url, Error> {
        let raw = format!("{}/{}", self.base_api_url, path.trim_start_matches('/'));
        let url = Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        let mut url = query.add_to_url(&url);
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    /// Performs a GET against `path`, retrying transport failures and
    /// non-success statuses, and returns the validated JSON body.
    pub async fn execute<Q: Query + ?Sized>(&self, path: &str, query: &Q) -> Result<Value, Error> {
        let url = self.get_url(path, query)?;
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::debug!("GET /{} (attempt {}/{})", path, attempt, max_attempts);
            match self.attempt(&url).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    if attempt >= max_attempts {
                        tracing::error!(
                            "/{} failed after {} attempts: {}",
                            path,
                            attempt,
                            err
                        );
                        return Err(Error::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                    tracing::warn!(
                        "/{} request failed (attempt {}/{}), retrying in {:.3}s: {}",
                        path,
                        attempt,
                        max_attempts,
                        self.retry.pause.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(self.retry.pause).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url) -> Result<Value, Error> {
        let resp = self
            .http
            .get(url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::warn!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        validate_response(status, &body)
    }

    async fn get<T: DeserializeOwned, Q: Query + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, Error> {
        let value = self.execute(path, query).await?;
        serde_json::from_value::<T>(value).map_err(|e| {
            tracing::error!("Failed to parse resource /{}: {}", path, e);
            Error::InvalidResponse(format!("unexpected payload shape: {}", e))
        })
    }

    /// Fetches full OHLCV chart data for every symbol in the query in one
    /// batch call.
    pub async fn get_chart(&self, query: &ChartQuery) -> Result<BatchResponse, Error> {
        let query = query.clone().with_close_only(false);
        self.get::<BatchResponse, ChartQuery>(query.path(), &query)
            .await
    }

    /// Like [`Client::get_chart`] with `chartCloseOnly=true`.
    pub async fn get_close_chart(
        &self,
        query: &ChartQuery,
    ) -> Result<BatchResponse<CloseBar>, Error> {
        let query = query.clone().with_close_only(true);
        self.get::<BatchResponse<CloseBar>, ChartQuery>(query.path(), &query)
            .await
    }

    /// Fetches any non-historical resource as raw JSON.
    pub async fn get_resource(&self, resource: &Resource) -> Result<Value, Error> {
        self.execute(&resource.path(), resource).await
    }
}

/// Checks a raw response and decodes its body.
///
/// The `Unknown symbol` sentinel wins over the status code. Success bodies
/// must be non-empty JSON without an `"Error Message"` field.
pub fn validate_response(status: StatusCode, body: &str) -> Result<Value, Error> {
    if body.trim() == UNKNOWN_SYMBOL_BODY {
        return Err(Error::UnknownSymbol);
    }

    if !status.is_success() {
        let snippet = truncate_body(body);
        tracing::warn!("Request failed with status {}: {}", status, snippet);
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: snippet,
        });
    }

    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        let snippet = truncate_body(body);
        tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
        Error::InvalidResponse(format!("malformed JSON: {}", e))
    })?;

    if is_empty_json(&parsed) {
        return Err(Error::EmptyResponse);
    }
    if let Some(message) = parsed.get("Error Message") {
        let message = message
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string());
        return Err(Error::InvalidResponse(message));
    }

    Ok(parsed)
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
