mod common;
pub use self::common::{ParamValue, Query, QueryParams};

mod chart;
pub use self::chart::ChartQuery;

mod resource;
pub use self::resource::{CryptoEndpoint, MoverList, QuotaType, Resource};
