pub mod registry;
pub mod traits;

// API provider implementations
pub mod bcb;
pub mod brapi;
pub mod yahoo_finance;
