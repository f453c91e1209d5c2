//! Environment-driven settings for the client and cache.

use std::path::PathBuf;
use std::time::Duration;

use iex_api::{ClientConfig, RetryPolicy, IEX_CLOUD_URL, IEX_LEGACY_URL};

pub const ENV_API_URL: &str = "IEX_API_URL";
pub const ENV_API_VERSION: &str = "IEX_API_VERSION";
pub const ENV_TOKEN: &str = "IEX_TOKEN";
pub const ENV_RETRY_COUNT: &str = "IEX_RETRY_COUNT";
pub const ENV_PAUSE_MS: &str = "IEX_PAUSE_MS";
pub const ENV_TIMEOUT_SECS: &str = "IEX_TIMEOUT_SECS";
pub const ENV_CACHE_PATH: &str = "IEX_CACHE_PATH";

const DEFAULT_RETRY_COUNT: u32 = 3;
const DEFAULT_PAUSE_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub retry_count: u32,
    pub pause_ms: u64,
    pub timeout_secs: u64,
    /// SQLite cache file. `None` means an in-memory store.
    pub cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: IEX_CLOUD_URL.to_string(),
            token: None,
            retry_count: DEFAULT_RETRY_COUNT,
            pause_ms: DEFAULT_PAUSE_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_path: None,
        }
    }
}

impl Config {
    /// Reads settings from the process environment. Unparseable numbers and
    /// empty strings fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty(ENV_API_URL)
                .or_else(|| {
                    non_empty(ENV_API_VERSION)
                        .and_then(|v| base_url_for_version(&v))
                        .map(str::to_string)
                })
                .unwrap_or_else(|| IEX_CLOUD_URL.to_string()),
            token: non_empty(ENV_TOKEN),
            retry_count: parse_or(non_empty(ENV_RETRY_COUNT), DEFAULT_RETRY_COUNT),
            pause_ms: parse_or(non_empty(ENV_PAUSE_MS), DEFAULT_PAUSE_MS),
            timeout_secs: parse_or(non_empty(ENV_TIMEOUT_SECS), DEFAULT_TIMEOUT_SECS),
            cache_path: non_empty(ENV_CACHE_PATH).map(PathBuf::from),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.pause_ms))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            retry: self.retry_policy(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Maps an `IEX_API_VERSION` value to its endpoint. Unknown versions are
/// ignored with a warning.
fn base_url_for_version(version: &str) -> Option<&'static str> {
    match version.trim().to_ascii_lowercase().as_str() {
        "v1" | "1.0" | "legacy" => Some(IEX_LEGACY_URL),
        "stable" | "cloud" | "iexcloud-v1" => Some(IEX_CLOUD_URL),
        other => {
            tracing::warn!("Ignoring unknown {} value {:?}", ENV_API_VERSION, other);
            None
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn reads_all_values() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_URL, "https://api.iextrading.com/1.0"),
            (ENV_TOKEN, "pk_123"),
            (ENV_RETRY_COUNT, "5"),
            (ENV_PAUSE_MS, "250"),
            (ENV_TIMEOUT_SECS, "10"),
            (ENV_CACHE_PATH, "/tmp/iex.sqlite"),
        ]));
        assert_eq!(config.base_url, "https://api.iextrading.com/1.0");
        assert_eq!(config.token.as_deref(), Some("pk_123"));
        assert_eq!(config.retry_count, 5);
        assert_eq!(config.pause_ms, 250);
        assert_eq!(config.cache_path, Some(PathBuf::from("/tmp/iex.sqlite")));

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.retry.pause, Duration::from_millis(250));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            (ENV_RETRY_COUNT, "lots"),
            (ENV_PAUSE_MS, "-3"),
            (ENV_TOKEN, "  "),
        ]));
        assert_eq!(config.retry_count, DEFAULT_RETRY_COUNT);
        assert_eq!(config.pause_ms, DEFAULT_PAUSE_MS);
        assert!(config.token.is_none());
    }

    #[test]
    fn api_version_selects_endpoint() {
        let config = Config::from_lookup(lookup(&[(ENV_API_VERSION, "v1")]));
        assert_eq!(config.base_url, IEX_LEGACY_URL);

        let config = Config::from_lookup(lookup(&[(ENV_API_VERSION, "iexcloud-v1")]));
        assert_eq!(config.base_url, IEX_CLOUD_URL);

        let config = Config::from_lookup(lookup(&[(ENV_API_VERSION, "beta2")]));
        assert_eq!(config.base_url, IEX_CLOUD_URL);
    }

    #[test]
    fn explicit_url_wins_over_version() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_VERSION, "legacy"),
            (ENV_API_URL, "http://localhost:8080"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080");
    }
}
