use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::quote::Quote;

use super::brapi::BrapiProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Providers are tried in registration order: if the primary fails (API
/// down, rate limited, etc.), the next one is used. New providers can be
/// added without modifying existing code.
///
/// The registry is itself a [`QuoteProvider`], so the refresh coordinator
/// consumes one source and stays unaware of the fallback chain.
pub struct QuoteProviderRegistry {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // brapi — B3 tickers, batch endpoint, token optional (primary)
        registry.register(Arc::new(BrapiProvider::new(
            api_keys.get("brapi").cloned(),
        )));

        // Yahoo Finance — global equities, no API key (fallback)
        if let Ok(yahoo) = YahooFinanceProvider::new() {
            registry.register(Arc::new(yahoo));
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Arc<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Names of the registered providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for QuoteProviderRegistry {
    fn name(&self) -> &str {
        "registry"
    }

    /// Fetch quotes with automatic fallback.
    ///
    /// Tries providers in registration order and returns the first
    /// successful result. Quotes with a non-finite or negative price are
    /// dropped from the result rather than poisoning downstream math.
    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> Result<Vec<Quote>, CoreError> {
        if self.providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in &self.providers {
            match provider.fetch_quotes(symbols).await {
                Ok(quotes) => {
                    let mut valid = Vec::with_capacity(quotes.len());
                    for quote in quotes {
                        if quote.price.is_finite() && quote.price >= 0.0 {
                            valid.push(quote);
                        } else {
                            warn!(
                                "{}: dropping quote for {} with invalid price {}",
                                provider.name(),
                                quote.symbol,
                                quote.price
                            );
                        }
                    }
                    return Ok(valid);
                }
                Err(e) => {
                    debug!("{} failed, trying next provider: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}
