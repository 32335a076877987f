use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Normalize a ticker symbol for matching: trimmed and case-folded.
///
/// Applied on BOTH sides (holdings at construction time, quotes when the
/// snapshot is built) so a holding matches its quote regardless of the
/// casing either source used.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// A snapshot of an instrument's current market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol as reported by the provider
    pub symbol: String,

    /// Human-readable name, when the provider supplies one
    /// (e.g., "Petróleo Brasileiro S.A.")
    #[serde(default)]
    pub display_name: Option<String>,

    /// Current market price per unit (non-negative)
    pub price: f64,

    /// When the provider reported this price
    pub fetched_at: DateTime<Utc>,
}

/// An immutable set of quotes keyed by normalized symbol.
///
/// Built once per successful fetch and replaced wholesale, never merged
/// field-by-field, so readers can never observe a torn snapshot. Readers
/// share it behind an `Arc`; see `services::refresh_service`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    quotes: HashMap<String, Quote>,

    /// Symbols this snapshot was fetched FOR (not just the ones that came
    /// back) — the refresh coordinator compares against this to decide
    /// whether a holding set needs a refetch.
    requested: BTreeSet<String>,
}

impl QuoteSnapshot {
    /// An empty snapshot — the state before the first successful fetch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from fetched quotes and the symbol set the fetch
    /// was issued for. Quote symbols are normalized on insertion; a
    /// duplicate symbol keeps the last quote seen.
    pub fn from_quotes(requested: BTreeSet<String>, quotes: Vec<Quote>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|q| (normalize_symbol(&q.symbol), q))
            .collect();
        Self { quotes, requested }
    }

    /// Look up the quote for a symbol (matching is case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(&normalize_symbol(symbol))
    }

    /// The symbols this snapshot was requested for.
    pub fn requested_symbols(&self) -> &BTreeSet<String> {
        &self.requested
    }

    /// True if every symbol in `symbols` was covered by this snapshot's
    /// request (whether or not a quote came back for it).
    pub fn covers(&self, symbols: &BTreeSet<String>) -> bool {
        symbols.is_subset(&self.requested)
    }

    /// Number of quotes actually present.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Iterate over (normalized symbol, quote) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Quote)> {
        self.quotes.iter()
    }
}
