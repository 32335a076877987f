use log::warn;

use crate::models::holding::Holding;
use crate::models::quote::{Quote, QuoteSnapshot};
use crate::models::valuation::{Valuation, ValuationStatus};

/// Matches holdings to quotes and computes per-holding valuation figures.
///
/// Pure business logic — no I/O, no shared state. The full valuation set is
/// recomputed on every pass; there is no incremental patching that could
/// drift from a from-scratch computation.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile each holding against the quote snapshot and value it.
    ///
    /// Matching is by normalized symbol (the snapshot index makes each
    /// lookup O(1)). Holdings without a quote come back `Unmatched` — still
    /// present in the result so callers can show them, carrying no figures.
    pub fn reconcile_and_value(
        &self,
        holdings: &[Holding],
        snapshot: &QuoteSnapshot,
    ) -> Vec<Valuation> {
        holdings
            .iter()
            .map(|h| self.value_holding(h, snapshot.get(&h.symbol)))
            .collect()
    }

    /// Value a single holding against its matched quote, if any.
    ///
    /// Construction guarantees `quantity > 0` and `average_price > 0`, so
    /// the gain-percentage division is always defined. Should corrupt data
    /// get past that boundary anyway (hand-built JSON, a broken store), the
    /// holding is flagged `Invalid` and excluded — figures are never
    /// computed from it, so no NaN or infinity can reach the aggregator.
    pub fn value_holding(&self, holding: &Holding, quote: Option<&Quote>) -> Valuation {
        let status = match quote {
            _ if holding.quantity == 0
                || !holding.average_price.is_finite()
                || holding.average_price <= 0.0 =>
            {
                warn!(
                    "holding {} ({}) violates positivity invariants \
                     (quantity={}, average_price={}); excluding from valuation",
                    holding.id, holding.symbol, holding.quantity, holding.average_price
                );
                ValuationStatus::Invalid
            }
            None => ValuationStatus::Unmatched,
            Some(quote) => {
                let quantity = f64::from(holding.quantity);
                let invested = holding.average_price * quantity;
                let current_value = quote.price * quantity;
                ValuationStatus::Matched {
                    invested,
                    current_value,
                    gain: current_value - invested,
                    gain_percentage: (quote.price - holding.average_price)
                        / holding.average_price
                        * 100.0,
                    price: quote.price,
                    display_name: quote.display_name.clone(),
                }
            }
        };

        Valuation {
            holding_id: holding.id,
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            average_price: holding.average_price,
            status,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
