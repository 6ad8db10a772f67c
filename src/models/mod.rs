pub mod pricing;
pub mod usage;

pub use pricing::RateTable;
pub use usage::*;
