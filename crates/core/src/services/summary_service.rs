use crate::models::valuation::{PortfolioSummary, Valuation, ValuationStatus};

/// Aggregates per-holding valuations into portfolio totals.
///
/// A pure, commutative fold: the order of the valuation list never changes
/// the result. Only `Matched` entries contribute; unmatched and invalid
/// holdings are counted so the caller can report them, but their absence of
/// figures cannot corrupt the totals.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, valuations: &[Valuation]) -> PortfolioSummary {
        let mut total_invested = 0.0;
        let mut total_current_value = 0.0;
        let mut matched = 0;
        let mut unmatched = 0;

        for valuation in valuations {
            match &valuation.status {
                ValuationStatus::Matched {
                    invested,
                    current_value,
                    ..
                } => {
                    total_invested += invested;
                    total_current_value += current_value;
                    matched += 1;
                }
                ValuationStatus::Unmatched | ValuationStatus::Invalid => unmatched += 1,
            }
        }

        let total_gain = total_current_value - total_invested;
        let total_gain_percentage = if total_invested > 0.0 {
            (total_gain / total_invested) * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            total_invested,
            total_current_value,
            total_gain,
            total_gain_percentage,
            matched,
            unmatched,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
