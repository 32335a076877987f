pub mod holding;
pub mod quote;
pub mod rate;
pub mod valuation;
