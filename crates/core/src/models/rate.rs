use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An external benchmark interest rate (e.g., SELIC) displayed alongside
/// the portfolio. Not part of valuation math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRate {
    /// Annualized rate in percent (e.g., 10.5 for 10.5% p.a.)
    pub value: f64,

    /// The date the rate took effect
    pub effective_date: NaiveDate,
}
