//! HTTP layer for the IEX market-data API: resource descriptors, query
//! builders, the retrying query executor, and wire types.

mod client;
mod errors;
mod query;
mod retry;
pub mod types;
pub use self::client::{validate_response, Client, ClientConfig, IEX_CLOUD_URL, IEX_LEGACY_URL};
pub use self::errors::Error;
pub use self::query::{
    ChartQuery, CryptoEndpoint, MoverList, ParamValue, Query, QueryParams, QuotaType, Resource,
};
pub use self::retry::RetryPolicy;
