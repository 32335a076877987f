use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of valuing one holding against the current quote snapshot.
///
/// Figures exist only in the `Matched` variant: an unmatched holding has
/// no numbers at all rather than zeros, which would misleadingly read as
/// a computed break-even.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ValuationStatus {
    /// A quote was found for the holding's symbol.
    Matched {
        /// `average_price × quantity`
        invested: f64,
        /// `quote price × quantity`
        current_value: f64,
        /// `current_value − invested`
        gain: f64,
        /// `(quote price − average_price) / average_price × 100`
        gain_percentage: f64,
        /// The quote price the figures were computed from
        price: f64,
        /// Display name from the quote, when the provider supplied one
        display_name: Option<String>,
    },
    /// No quote for the holding's symbol in the current snapshot.
    Unmatched,
    /// The holding's stored data violates the positivity invariants
    /// (possible only through corrupt external data). Excluded from
    /// totals, flagged for the caller.
    Invalid,
}

/// The computed financial outcome for a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub holding_id: Uuid,
    pub symbol: String,
    pub quantity: u32,
    pub average_price: f64,
    pub status: ValuationStatus,
}

impl Valuation {
    pub fn is_matched(&self) -> bool {
        matches!(self.status, ValuationStatus::Matched { .. })
    }

    /// The gain figure, if this valuation is matched.
    pub fn gain(&self) -> Option<f64> {
        match &self.status {
            ValuationStatus::Matched { gain, .. } => Some(*gain),
            _ => None,
        }
    }

    /// The invested amount, if this valuation is matched.
    pub fn invested(&self) -> Option<f64> {
        match &self.status {
            ValuationStatus::Matched { invested, .. } => Some(*invested),
            _ => None,
        }
    }

    /// The current market value, if this valuation is matched.
    pub fn current_value(&self) -> Option<f64> {
        match &self.status {
            ValuationStatus::Matched { current_value, .. } => Some(*current_value),
            _ => None,
        }
    }
}

/// Aggregated valuation across all matched holdings.
///
/// Totals are a commutative fold over `Matched` valuations only;
/// unmatched and invalid holdings are counted but contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub total_current_value: f64,

    /// `total_current_value − total_invested`
    pub total_gain: f64,

    /// `(total_gain / total_invested) × 100`, or `0.0` when nothing
    /// matched (never a division by zero)
    pub total_gain_percentage: f64,

    /// Holdings that contributed to the totals
    pub matched: usize,

    /// Holdings excluded from the totals (no quote, or invalid data)
    pub unmatched: usize,
}

/// One recomputed pass over a user's portfolio: every holding's valuation
/// plus the aggregated totals, produced together from the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioView {
    pub valuations: Vec<Valuation>,
    pub summary: PortfolioSummary,
}
