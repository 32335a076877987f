use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://brapi.dev/api";

/// brapi.dev quote provider for B3-listed instruments.
///
/// - **Free tier**: works without a token; a token raises rate limits.
/// - **Coverage**: B3 stocks, FIIs, BDRs (PETR4, MXRF11, ...).
/// - **Batch**: one request covers the whole symbol set
///   (`/quote/PETR4,MXRF11`).
///
/// Symbols the API does not know are simply absent from `results` —
/// that is a partial result, not an error.
pub struct BrapiProvider {
    client: Client,
    token: Option<String>,
}

impl BrapiProvider {
    pub fn new(token: Option<String>) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            token,
        }
    }
}

// ── brapi API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct QuoteListResponse {
    #[serde(default)]
    results: Vec<BrapiQuote>,
}

#[derive(Deserialize)]
struct BrapiQuote {
    symbol: String,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[async_trait]
impl QuoteProvider for BrapiProvider {
    fn name(&self) -> &str {
        "brapi"
    }

    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> Result<Vec<Quote>, CoreError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let list = symbols.iter().cloned().collect::<Vec<_>>().join(",");
        let mut url = format!("{BASE_URL}/quote/{list}");
        if let Some(token) = &self.token {
            url.push_str(&format!("?token={token}"));
        }

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CoreError::MarketData {
                provider: "brapi".into(),
                message: format!("Quote request failed with HTTP {}", response.status()),
            });
        }

        let body: QuoteListResponse =
            response.json().await.map_err(|e| CoreError::MarketData {
                provider: "brapi".into(),
                message: format!("Failed to parse quote response: {e}"),
            })?;

        let fetched_at = Utc::now();
        let quotes: Vec<Quote> = body
            .results
            .into_iter()
            .filter_map(|q| {
                // Entries without a market price (suspended listings etc.)
                // count as absent, same as unknown symbols.
                let price = match q.regular_market_price {
                    Some(p) => p,
                    None => {
                        debug!("brapi: no market price for {}", q.symbol);
                        return None;
                    }
                };
                Some(Quote {
                    symbol: q.symbol,
                    display_name: q.short_name,
                    price,
                    fetched_at,
                })
            })
            .collect();

        Ok(quotes)
    }
}
