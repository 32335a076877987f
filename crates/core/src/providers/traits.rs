use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::models::rate::ReferenceRate;

/// Trait abstraction for market quote sources.
///
/// Each API provider (brapi, Yahoo Finance) implements this trait. If an
/// API stops working or changes, we replace only that one implementation —
/// the rest of the codebase is untouched.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch current quotes for a set of symbols.
    ///
    /// A partial result — some symbols absent from the returned list —
    /// is NOT an error; unknown tickers simply come back without a quote.
    /// An `Err` means the fetch as a whole failed (network, API down).
    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> Result<Vec<Quote>, CoreError>;
}

/// Trait abstraction for reference-rate sources (benchmark interest rates).
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the current reference rate.
    async fn fetch_rate(&self) -> Result<ReferenceRate, CoreError>;
}
