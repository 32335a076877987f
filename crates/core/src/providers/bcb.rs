use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rate::ReferenceRate;
use super::traits::RateProvider;

const BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

/// SGS series number for the Selic target rate (% p.a.).
const SELIC_TARGET_SERIES: u32 = 432;

/// Banco Central do Brasil reference-rate provider (SGS open-data API).
///
/// - **Free**: No API key, public statistical series.
/// - **Series 432**: Selic target rate, annualized percent.
///
/// The endpoint returns the most recent observation as a one-element JSON
/// array with Brazilian-formatted dates (`dd/mm/yyyy`) and the value as a
/// string.
pub struct BcbRateProvider {
    client: Client,
    series: u32,
}

impl BcbRateProvider {
    pub fn new() -> Self {
        Self::for_series(SELIC_TARGET_SERIES)
    }

    /// Use a different SGS series (e.g., CDI) with the same wire format.
    pub fn for_series(series: u32) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            series,
        }
    }

    /// Parse one SGS observation into a [`ReferenceRate`].
    fn parse_observation(obs: &SgsObservation) -> Result<ReferenceRate, CoreError> {
        let effective_date = NaiveDate::parse_from_str(&obs.data, "%d/%m/%Y")
            .map_err(|e| CoreError::MarketData {
                provider: "BCB".into(),
                message: format!("Invalid observation date '{}': {e}", obs.data),
            })?;
        let value: f64 = obs.valor.parse().map_err(|e| CoreError::MarketData {
            provider: "BCB".into(),
            message: format!("Invalid observation value '{}': {e}", obs.valor),
        })?;
        Ok(ReferenceRate {
            value,
            effective_date,
        })
    }
}

impl Default for BcbRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── SGS API response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct SgsObservation {
    data: String,
    valor: String,
}

#[async_trait]
impl RateProvider for BcbRateProvider {
    fn name(&self) -> &str {
        "BCB"
    }

    async fn fetch_rate(&self) -> Result<ReferenceRate, CoreError> {
        let url = format!(
            "{BASE_URL}/bcdata.sgs.{}/dados/ultimos/1?formato=json",
            self.series
        );

        let observations: Vec<SgsObservation> = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::MarketData {
                provider: "BCB".into(),
                message: format!("Failed to parse series {} response: {e}", self.series),
            })?;

        let latest = observations.last().ok_or_else(|| CoreError::MarketData {
            provider: "BCB".into(),
            message: format!("Series {} returned no observations", self.series),
        })?;

        Self::parse_observation(latest)
    }
}
