mod chart;
pub use self::chart::{BatchEntry, BatchResponse, ChartBar, CloseBar};

mod range;
pub use self::range::ChartRange;
