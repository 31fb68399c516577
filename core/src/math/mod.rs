pub mod filters;
pub mod stats;

pub use filters::{first_order_lag, first_order_washout, FirstOrder};
pub use stats::{StatsHelper, ValidStats};
