use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use super::quote::normalize_symbol;

/// A user's recorded position in a financial instrument.
///
/// Holdings are owned by the external store; the engine treats them as
/// immutable input per computation pass. Construction enforces the field
/// constraints, so a `Holding` that exists is arithmetically safe:
/// `quantity > 0` and `average_price > 0` always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    /// Owner the holding belongs to (store queries filter by this)
    pub owner_id: String,

    /// Ticker symbol, normalized (uppercased) on construction
    /// (e.g., "PETR4", "MXRF11", "AAPL")
    pub symbol: String,

    /// Number of units held (whole shares/quotas, strictly positive)
    pub quantity: u32,

    /// Average acquisition price per unit (strictly positive)
    pub average_price: f64,

    /// Creation timestamp — listings are ordered newest-first by this
    pub created_at: DateTime<Utc>,
}

impl Holding {
    /// Create a validated holding. Rejects empty symbols, zero quantity and
    /// non-positive or non-finite average prices so that invalid values
    /// never reach valuation arithmetic.
    pub fn new(
        owner_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: u32,
        average_price: f64,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(CoreError::Validation(
                "Holding symbol must not be empty".into(),
            ));
        }
        if quantity == 0 {
            return Err(CoreError::Validation(
                "Holding quantity must be positive".into(),
            ));
        }
        if !average_price.is_finite() || average_price <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Holding average price must be positive and finite, got {average_price}"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            symbol: normalize_symbol(&symbol),
            quantity,
            average_price,
            created_at: Utc::now(),
        })
    }
}

/// Partial update applied to a stored holding. `None` fields are left as-is.
///
/// The same positivity constraints as [`Holding::new`] apply to the changed
/// fields; the store validates before persisting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldingPatch {
    pub symbol: Option<String>,
    pub quantity: Option<u32>,
    pub average_price: Option<f64>,
}

impl HoldingPatch {
    /// Apply the patch to a holding, re-running field validation.
    pub fn apply_to(&self, holding: &Holding) -> Result<Holding, CoreError> {
        let mut updated = Holding::new(
            holding.owner_id.clone(),
            self.symbol.clone().unwrap_or_else(|| holding.symbol.clone()),
            self.quantity.unwrap_or(holding.quantity),
            self.average_price.unwrap_or(holding.average_price),
        )?;
        // Identity and creation time survive the update
        updated.id = holding.id;
        updated.created_at = holding.created_at;
        Ok(updated)
    }
}
