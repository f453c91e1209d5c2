//! Descriptors for the non-historical endpoints.
//!
//! Every reader the API offers outside of the chart endpoint is a stateless
//! mapping from a few arguments to a path and a handful of query parameters,
//! so a single enum describes them all.

use std::fmt;
use std::str::FromStr;

use super::{Query, QueryParams};

/// A non-historical API resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// `stock/{symbol}/quote`
    Quote { symbol: String, display_percent: bool },
    /// `stock/{symbol}/company`
    Company { symbol: String },
    /// `stock/{symbol}/price`
    Price { symbol: String },
    /// `crypto/{symbol}/{endpoint}`
    Crypto {
        symbol: String,
        endpoint: CryptoEndpoint,
    },
    /// `stock/market/list/{list}`
    Movers(MoverList),
    /// `stock/market/sector-performance`
    SectorPerformance,
    /// `ref-data/symbols`
    Symbols,
    /// `ref-data/iex/symbols`
    IexSymbols,
    /// `ref-data/sectors`
    Sectors,
    /// `ref-data/region/{region}/symbols`
    RegionSymbols(String),
    /// `ref-data/exchange/{exchange}/symbols`
    ExchangeSymbols(String),
    /// `account/metadata`
    AccountMetadata,
    /// `account/usage/{quota_type}`
    AccountUsage(QuotaType),
    /// `account/payasyougo`
    PayAsYouGo { allow: bool },
}

impl Resource {
    pub fn quote(symbol: &str) -> Self {
        Resource::Quote {
            symbol: symbol.to_uppercase(),
            display_percent: false,
        }
    }

    pub fn crypto(symbol: &str, endpoint: CryptoEndpoint) -> Self {
        Resource::Crypto {
            symbol: symbol.to_uppercase(),
            endpoint,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Resource::Quote { symbol, .. } => format!("stock/{}/quote", symbol),
            Resource::Company { symbol } => format!("stock/{}/company", symbol),
            Resource::Price { symbol } => format!("stock/{}/price", symbol),
            Resource::Crypto { symbol, endpoint } => format!("crypto/{}/{}", symbol, endpoint),
            Resource::Movers(list) => format!("stock/market/list/{}", list),
            Resource::SectorPerformance => "stock/market/sector-performance".to_string(),
            Resource::Symbols => "ref-data/symbols".to_string(),
            Resource::IexSymbols => "ref-data/iex/symbols".to_string(),
            Resource::Sectors => "ref-data/sectors".to_string(),
            Resource::RegionSymbols(region) => {
                format!("ref-data/region/{}/symbols", region.to_lowercase())
            }
            Resource::ExchangeSymbols(exchange) => {
                format!("ref-data/exchange/{}/symbols", exchange.to_lowercase())
            }
            Resource::AccountMetadata => "account/metadata".to_string(),
            Resource::AccountUsage(quota) => format!("account/usage/{}", quota),
            Resource::PayAsYouGo { .. } => "account/payasyougo".to_string(),
        }
    }
}

impl Query for Resource {
    fn params(&self) -> QueryParams {
        match self {
            Resource::Quote {
                display_percent, ..
            } => QueryParams::new().with("displayPercent", *display_percent),
            Resource::PayAsYouGo { allow } => QueryParams::new().with("allow", *allow),
            _ => QueryParams::new(),
        }
    }
}

/// Sub-resources of `crypto/{symbol}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CryptoEndpoint {
    Book,
    Price,
    #[default]
    Quote,
}

impl fmt::Display for CryptoEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CryptoEndpoint::Book => "book",
            CryptoEndpoint::Price => "price",
            CryptoEndpoint::Quote => "quote",
        })
    }
}

impl FromStr for CryptoEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" => Ok(CryptoEndpoint::Book),
            "price" => Ok(CryptoEndpoint::Price),
            "quote" => Ok(CryptoEndpoint::Quote),
            _ => Err(format!(
                "unknown crypto endpoint '{}'. Valid values: book, price, quote",
                s
            )),
        }
    }
}

/// Market mover lists served under `stock/market/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverList {
    MostActive,
    Gainers,
    Losers,
    IexVolume,
    IexPercent,
    InFocus,
}

impl MoverList {
    pub const ALL: [MoverList; 6] = [
        MoverList::MostActive,
        MoverList::Gainers,
        MoverList::Losers,
        MoverList::IexVolume,
        MoverList::IexPercent,
        MoverList::InFocus,
    ];
}

impl fmt::Display for MoverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoverList::MostActive => "mostactive",
            MoverList::Gainers => "gainers",
            MoverList::Losers => "losers",
            MoverList::IexVolume => "iexvolume",
            MoverList::IexPercent => "iexpercent",
            MoverList::InFocus => "infocus",
        })
    }
}

impl FromStr for MoverList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MoverList::ALL
            .iter()
            .copied()
            .find(|m| m.to_string() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown market mover '{}'. Valid values: mostactive, gainers, losers, iexvolume, iexpercent, infocus",
                    s
                )
            })
    }
}

/// Quota categories reported by `account/usage`.
///
/// The service lists the type as optional but rejects requests without it,
/// so `Messages` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaType {
    #[default]
    Messages,
    Rules,
    RuleRecords,
    Alerts,
    AlertRecords,
}

impl fmt::Display for QuotaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuotaType::Messages => "messages",
            QuotaType::Rules => "rules",
            QuotaType::RuleRecords => "rule-records",
            QuotaType::Alerts => "alerts",
            QuotaType::AlertRecords => "alert-records",
        })
    }
}

impl FromStr for QuotaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "messages" => Ok(QuotaType::Messages),
            "rules" => Ok(QuotaType::Rules),
            "rule-records" => Ok(QuotaType::RuleRecords),
            "alerts" => Ok(QuotaType::Alerts),
            "alert-records" => Ok(QuotaType::AlertRecords),
            _ => Err(format!(
                "unknown quota type '{}'. Valid values: messages, rules, rule-records, alerts, alert-records",
                s
            )),
        }
    }
}
