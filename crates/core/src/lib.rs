pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use log::warn;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use errors::CoreError;
use models::{
    holding::{Holding, HoldingPatch},
    quote::QuoteSnapshot,
    rate::ReferenceRate,
    valuation::{PortfolioView, Valuation},
};
use providers::bcb::BcbRateProvider;
use providers::registry::QuoteProviderRegistry;
use providers::traits::{QuoteProvider, RateProvider};
use services::refresh_service::{QuoteRefresher, RefreshState};
use services::summary_service::SummaryService;
use services::valuation_service::ValuationService;
use storage::traits::HoldingStore;

/// Main entry point for the Portfolio Tracker core library.
///
/// Wires the external collaborators (holding store, quote source, optional
/// reference-rate source) to the valuation engine. Holdings and quotes flow
/// through pure per-pass computation; the quote snapshot inside the refresh
/// coordinator is the only mutable shared state.
#[must_use]
pub struct PortfolioTracker {
    store: Arc<dyn HoldingStore>,
    refresher: QuoteRefresher,
    rate_source: Option<Arc<dyn RateProvider>>,
    valuation_service: ValuationService,
    summary_service: SummaryService,
    /// Last successfully fetched reference rate, retained across failures.
    last_rate: Mutex<Option<ReferenceRate>>,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("refresh_state", &self.refresher.state())
            .field("cached_quotes", &self.refresher.snapshot().len())
            .finish()
    }
}

impl PortfolioTracker {
    /// Build a tracker over an explicit store and quote source.
    pub fn new(store: Arc<dyn HoldingStore>, quote_source: Arc<dyn QuoteProvider>) -> Self {
        Self {
            store,
            refresher: QuoteRefresher::new(quote_source),
            rate_source: None,
            valuation_service: ValuationService::new(),
            summary_service: SummaryService::new(),
            last_rate: Mutex::new(None),
        }
    }

    /// Build a tracker with the default provider stack: brapi with Yahoo
    /// Finance fallback for quotes, Banco Central (Selic) for the rate.
    pub fn with_defaults(
        store: Arc<dyn HoldingStore>,
        api_keys: &HashMap<String, String>,
    ) -> Self {
        let registry = QuoteProviderRegistry::new_with_defaults(api_keys);
        Self::new(store, Arc::new(registry)).with_rate_source(Arc::new(BcbRateProvider::new()))
    }

    /// Attach a reference-rate source.
    pub fn with_rate_source(mut self, source: Arc<dyn RateProvider>) -> Self {
        self.rate_source = Some(source);
        self
    }

    // ── Holding Management ──────────────────────────────────────────

    /// Record a new holding. Field constraints (non-empty symbol, positive
    /// quantity and average price) are enforced here, before anything is
    /// persisted.
    pub async fn add_holding(
        &self,
        owner_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: u32,
        average_price: f64,
    ) -> Result<Holding, CoreError> {
        let holding = Holding::new(owner_id, symbol, quantity, average_price)?;
        self.store.create(holding).await
    }

    /// All holdings for an owner, newest-first.
    pub async fn holdings(&self, owner_id: &str) -> Result<Vec<Holding>, CoreError> {
        self.store.list_for_owner(owner_id).await
    }

    /// Apply a partial update to a stored holding.
    pub async fn update_holding(&self, id: Uuid, patch: HoldingPatch) -> Result<(), CoreError> {
        self.store.update(id, patch).await
    }

    /// Remove a holding.
    pub async fn remove_holding(&self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete(id).await
    }

    // ── Quotes & Valuation ──────────────────────────────────────────

    /// Explicitly refetch quotes for every symbol the owner currently
    /// holds ("update prices"). Concurrent calls for the same symbol set
    /// coalesce into a single outbound request.
    pub async fn refresh_quotes(&self, owner_id: &str) -> Result<Arc<QuoteSnapshot>, CoreError> {
        let symbols = self.owner_symbols(owner_id).await?;
        self.refresher.refresh(&symbols).await
    }

    /// Value the owner's holdings against the current snapshot without
    /// triggering any fetch. Holdings without a quote come back
    /// `Unmatched`, carrying no figures.
    pub async fn valuations(&self, owner_id: &str) -> Result<Vec<Valuation>, CoreError> {
        let holdings = self.store.list_for_owner(owner_id).await?;
        let snapshot = self.refresher.snapshot();
        Ok(self
            .valuation_service
            .reconcile_and_value(&holdings, &snapshot))
    }

    /// One full portfolio pass: make sure the snapshot covers the owner's
    /// symbols (fetching only if new symbols appeared), then recompute
    /// every valuation and the aggregated summary from scratch.
    ///
    /// A failed fetch does not fail the pass: figures fall back to the
    /// retained snapshot and the error is visible via [`Self::refresh_state`]
    /// and [`Self::last_refresh_error`].
    pub async fn portfolio_view(&self, owner_id: &str) -> Result<PortfolioView, CoreError> {
        let holdings = self.store.list_for_owner(owner_id).await?;
        let symbols: BTreeSet<String> =
            holdings.iter().map(|h| h.symbol.clone()).collect();

        let snapshot = match self.refresher.ensure_fresh(&symbols).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("quote refresh failed, valuing against retained snapshot: {e}");
                self.refresher.snapshot()
            }
        };

        let valuations = self
            .valuation_service
            .reconcile_and_value(&holdings, &snapshot);
        let summary = self.summary_service.summarize(&valuations);
        Ok(PortfolioView {
            valuations,
            summary,
        })
    }

    /// The quote snapshot currently used for valuation.
    #[must_use]
    pub fn quote_snapshot(&self) -> Arc<QuoteSnapshot> {
        self.refresher.snapshot()
    }

    /// Current refresh coordinator state (`Idle | Fetching | Error`).
    #[must_use]
    pub fn refresh_state(&self) -> RefreshState {
        self.refresher.state()
    }

    /// Message of the most recent failed refresh, if the last one failed.
    #[must_use]
    pub fn last_refresh_error(&self) -> Option<String> {
        self.refresher.last_error()
    }

    // ── Reference Rate ──────────────────────────────────────────────

    /// Fetch the reference rate (e.g., Selic). On failure the last
    /// successfully fetched value is returned instead, if there is one —
    /// same stale-data-over-no-data policy as quotes.
    pub async fn reference_rate(&self) -> Result<ReferenceRate, CoreError> {
        let source = self.rate_source.as_ref().ok_or(CoreError::NoProvider)?;
        match source.fetch_rate().await {
            Ok(rate) => {
                *self.lock_rate() = Some(rate.clone());
                Ok(rate)
            }
            Err(e) => {
                let cached = self.lock_rate().clone();
                match cached {
                    Some(rate) => {
                        warn!("rate fetch failed, serving last known value: {e}");
                        Ok(rate)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Last successfully fetched reference rate, without fetching.
    #[must_use]
    pub fn last_reference_rate(&self) -> Option<ReferenceRate> {
        self.lock_rate().clone()
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn owner_symbols(&self, owner_id: &str) -> Result<BTreeSet<String>, CoreError> {
        let holdings = self.store.list_for_owner(owner_id).await?;
        Ok(holdings.into_iter().map(|h| h.symbol).collect())
    }

    fn lock_rate(&self) -> std::sync::MutexGuard<'_, Option<ReferenceRate>> {
        self.last_rate.lock().expect("reference rate lock poisoned")
    }
}
