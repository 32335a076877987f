use log::{debug, warn};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::quote::{normalize_symbol, QuoteSnapshot};
use crate::providers::traits::QuoteProvider;

/// Externally observable state of the refresh coordinator.
///
/// The machine is long-lived and re-enterable: `Error` is not terminal,
/// the next refresh call moves it back through `Fetching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    Error,
}

/// Result of a completed fetch, broadcast to every coalesced caller.
#[derive(Clone)]
enum FetchOutcome {
    Snapshot(Arc<QuoteSnapshot>),
    Failed(String),
}

/// Bookkeeping for the fetch currently on the wire.
struct InFlight {
    /// Normalized symbol set the fetch was issued for.
    symbols: BTreeSet<String>,
    /// Monotonic fetch generation, for last-writer-wins on completion.
    generation: u64,
    /// Receiver later callers subscribe to instead of fetching again.
    rx: watch::Receiver<Option<FetchOutcome>>,
}

struct Inner {
    state: RefreshState,
    snapshot: Arc<QuoteSnapshot>,
    last_error: Option<String>,
    in_flight: Option<InFlight>,
    /// Generation handed to the next fetch (starts at 1).
    next_generation: u64,
    /// Generation of the fetch whose result the snapshot currently holds.
    applied_generation: u64,
}

/// Coordinates quote refreshes for the current holding set.
///
/// Guarantees, per refresh call:
/// - **Single flight**: while a fetch covering the requested symbols is in
///   flight, further refresh calls coalesce onto it — exactly one outbound
///   request, every caller observes the same resolved snapshot.
/// - **Atomic replace**: the snapshot is an `Arc<QuoteSnapshot>` swapped
///   wholesale on success; readers never see a half-updated set.
/// - **Stale data beats no data**: on failure the previous snapshot is
///   retained, the state moves to `Error`, and the error is surfaced to the
///   caller. No retry happens inside the coordinator.
/// - **Last writer wins by completion time**: when a refresh supersedes an
///   in-flight fetch for an outdated symbol set, whichever fetch completes
///   later owns the snapshot; a late-arriving result from an older fetch is
///   discarded once a newer one has applied.
///
/// Reconciliation, valuation and aggregation never suspend; awaiting the
/// provider inside [`QuoteRefresher::refresh`] is the library's only
/// suspension point.
pub struct QuoteRefresher {
    source: Arc<dyn QuoteProvider>,
    inner: Mutex<Inner>,
}

impl QuoteRefresher {
    pub fn new(source: Arc<dyn QuoteProvider>) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                state: RefreshState::Idle,
                snapshot: Arc::new(QuoteSnapshot::empty()),
                last_error: None,
                in_flight: None,
                next_generation: 1,
                applied_generation: 0,
            }),
        }
    }

    /// Refresh quotes for `symbols`, coalescing onto an in-flight fetch
    /// when one already covers them.
    pub async fn refresh(
        &self,
        symbols: &BTreeSet<String>,
    ) -> Result<Arc<QuoteSnapshot>, CoreError> {
        let requested: BTreeSet<String> =
            symbols.iter().map(|s| normalize_symbol(s)).collect();

        enum Next {
            Coalesce(watch::Receiver<Option<FetchOutcome>>),
            Drive(watch::Sender<Option<FetchOutcome>>, u64),
        }

        let next = {
            let mut inner = self.lock();

            let coalesce = if let Some(in_flight) = &inner.in_flight {
                if requested.is_subset(&in_flight.symbols) {
                    debug!(
                        "coalescing refresh of {} symbols onto in-flight fetch (gen {})",
                        requested.len(),
                        in_flight.generation
                    );
                    Some(in_flight.rx.clone())
                } else {
                    // The in-flight fetch misses some of the requested
                    // symbols: start a superseding fetch for the new set. The
                    // old one is not cancelled; its result is discarded if it
                    // loses the completion race.
                    debug!(
                        "in-flight fetch (gen {}) does not cover the requested set; superseding",
                        in_flight.generation
                    );
                    None
                }
            } else {
                None
            };

            match coalesce {
                Some(rx) => Next::Coalesce(rx),
                None => {
                    let (tx, rx) = watch::channel(None);
                    let generation = inner.next_generation;
                    inner.next_generation += 1;
                    inner.state = RefreshState::Fetching;
                    inner.in_flight = Some(InFlight {
                        symbols: requested.clone(),
                        generation,
                        rx,
                    });
                    Next::Drive(tx, generation)
                }
            }
        };

        // Awaiting an in-flight fetch happens outside the locked block above
        // so the guard is released (and not held across this suspension).
        let (tx, generation) = match next {
            Next::Coalesce(rx) => return self.await_outcome(rx).await,
            Next::Drive(tx, generation) => (tx, generation),
        };

        // The only suspension point: this caller drives the fetch itself.
        let result = self.source.fetch_quotes(&requested).await;

        let mut inner = self.lock();
        let latest = inner
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation);

        match result {
            Ok(quotes) => {
                if generation > inner.applied_generation {
                    inner.snapshot =
                        Arc::new(QuoteSnapshot::from_quotes(requested, quotes));
                    inner.applied_generation = generation;
                    inner.last_error = None;
                } else {
                    debug!(
                        "discarding stale fetch result (gen {generation} <= applied gen {})",
                        inner.applied_generation
                    );
                }
                if latest {
                    inner.state = RefreshState::Idle;
                    inner.in_flight = None;
                }
                // Waiters always resolve to the authoritative snapshot,
                // which is the newer one when this fetch lost the race.
                let snapshot = inner.snapshot.clone();
                let _ = tx.send(Some(FetchOutcome::Snapshot(snapshot.clone())));
                Ok(snapshot)
            }
            Err(e) => {
                warn!("quote refresh failed (gen {generation}): {e}");
                let message = e.to_string();
                inner.last_error = Some(message.clone());
                if latest {
                    inner.state = RefreshState::Error;
                    inner.in_flight = None;
                }
                let _ = tx.send(Some(FetchOutcome::Failed(message)));
                Err(e)
            }
        }
    }

    /// Refresh only when `symbols` contains entries the current snapshot
    /// was not fetched for; otherwise return it without suspending. This is
    /// the change-detector callers run after the holding set mutates.
    pub async fn ensure_fresh(
        &self,
        symbols: &BTreeSet<String>,
    ) -> Result<Arc<QuoteSnapshot>, CoreError> {
        let requested: BTreeSet<String> =
            symbols.iter().map(|s| normalize_symbol(s)).collect();
        {
            let inner = self.lock();
            if inner.snapshot.covers(&requested) {
                return Ok(inner.snapshot.clone());
            }
        }
        self.refresh(&requested).await
    }

    /// The most recently applied snapshot (empty before the first success).
    pub fn snapshot(&self) -> Arc<QuoteSnapshot> {
        self.lock().snapshot.clone()
    }

    /// Current coordinator state.
    pub fn state(&self) -> RefreshState {
        self.lock().state
    }

    /// Message of the most recent failed refresh, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("refresh coordinator lock poisoned")
    }

    /// Wait for an in-flight fetch to broadcast its outcome.
    async fn await_outcome(
        &self,
        mut rx: watch::Receiver<Option<FetchOutcome>>,
    ) -> Result<Arc<QuoteSnapshot>, CoreError> {
        loop {
            let outcome = rx.borrow().clone();
            match outcome {
                Some(FetchOutcome::Snapshot(snapshot)) => return Ok(snapshot),
                Some(FetchOutcome::Failed(message)) => {
                    return Err(CoreError::MarketData {
                        provider: self.source.name().to_string(),
                        message,
                    });
                }
                None => {
                    if rx.changed().await.is_err() {
                        // Driving caller went away without broadcasting
                        // (cancelled mid-fetch). Clear the dead in-flight
                        // entry so the machine stays re-enterable.
                        let message = "refresh was abandoned before completing".to_string();
                        let mut inner = self.lock();
                        if inner
                            .in_flight
                            .as_ref()
                            .is_some_and(|f| f.rx.has_changed().is_err())
                        {
                            inner.in_flight = None;
                            inner.state = RefreshState::Error;
                            inner.last_error = Some(message.clone());
                        }
                        return Err(CoreError::MarketData {
                            provider: self.source.name().to_string(),
                            message,
                        });
                    }
                }
            }
        }
    }
}
