use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use super::traits::QuoteProvider;

/// Yahoo Finance quote provider, used as fallback when brapi is down.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. The API quotes one symbol per request, so the symbol set is
/// fetched sequentially; a symbol that fails individually is treated as
/// absent (partial result). Only a fetch that yields nothing while every
/// request errored counts as a provider failure.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::MarketData {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> Result<Vec<Quote>, CoreError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        let mut last_failure: Option<String> = None;

        for symbol in symbols {
            let close = match self.connector.get_latest_quotes(symbol, "1d").await {
                Ok(resp) => match resp.last_quote() {
                    Ok(q) => q.close,
                    Err(e) => {
                        debug!("Yahoo Finance: no quote data for {symbol}: {e}");
                        last_failure = Some(format!("No quote data for {symbol}: {e}"));
                        continue;
                    }
                },
                Err(e) => {
                    debug!("Yahoo Finance: fetch failed for {symbol}: {e}");
                    last_failure = Some(format!("Fetch failed for {symbol}: {e}"));
                    continue;
                }
            };

            quotes.push(Quote {
                symbol: symbol.clone(),
                display_name: None,
                price: close,
                fetched_at: Utc::now(),
            });
        }

        // Every symbol failed: report a provider failure instead of an
        // empty success, which would replace a good snapshot with nothing.
        if quotes.is_empty() && !symbols.is_empty() {
            if let Some(message) = last_failure {
                return Err(CoreError::MarketData {
                    provider: "Yahoo Finance".into(),
                    message,
                });
            }
        }

        Ok(quotes)
    }
}
