//! Quote Synchronizer
//!
//! Keeps the derived side of the amount pair in line with the authoritative
//! side through the external pricing provider.
//!
//! # Flow
//!
//! ```text
//! buffer change ─▶ debounce (window) ─▶ issue(seq = n) ─▶ provider.quote()
//!                      │                     │                   │
//!                 newer change            amount ≤ 0        response(seq)
//!                 drops ticket        reset derived side    seq == latest? ─▶ apply
//!                                                                 └─ else ─▶ discard
//! ```
//!
//! # Ordering Invariants
//!
//! 1. **Latest-wins**: only the response to the most recently issued request
//!    may touch the buffer. Anything older is discarded on arrival.
//! 2. **Derived side only**: a response never writes the authoritative side.
//! 3. **No locks across awaits**: keystrokes are never queued behind a quote.
//!
//! Lock order is always buffer, then synchronizer state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::provider::PricingProvider;
use super::types::{QuoteError, QuoteRequest, QuoteResult, QuoteRoute};
use crate::amount::{AmountBuffer, EditingMode, Precision};
use crate::core_types::SeqNum;
use crate::money;
use crate::util::lock;

/// Buffer shared between one entry session and its synchronizer.
pub type SharedBuffer = Arc<Mutex<AmountBuffer>>;

/// Timing and precision settings.
#[derive(Debug, Clone, Copy)]
pub struct QuoteSettings {
    /// Quiet period before a burst of edits turns into one request
    pub debounce: Duration,
    /// Upper bound on a single provider call
    pub timeout: Duration,
    pub precision: Precision,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
            precision: Precision::default(),
        }
    }
}

/// What happened to one synchronization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteApplied {
    /// Converted amount written into the derived side
    Applied,
    /// Authoritative amount ≤ 0: derived side reset, no request issued
    Skipped,
    /// Response superseded by a newer request (or mode switch) and dropped
    Discarded,
    /// Latest request failed: derived side reset, error flag set
    Failed(QuoteError),
}

#[derive(Debug)]
struct SyncState {
    route: QuoteRoute,
    /// Ticket of the most recent buffer change (debounce)
    change_ticket: u64,
    /// Sequence of the most recently issued or superseding request
    latest_seq: SeqNum,
    in_flight: bool,
    error: Option<QuoteError>,
    detached: bool,
}

struct Inner {
    pricing: Arc<dyn PricingProvider>,
    buffer: SharedBuffer,
    settings: QuoteSettings,
    state: Mutex<SyncState>,
}

/// Debounced, latest-wins quote synchronizer.
///
/// Cheap to clone; clones share state. Debounce timers run on the ambient
/// tokio runtime, so [`on_buffer_changed`](Self::on_buffer_changed) must be
/// called from within one.
#[derive(Clone)]
pub struct QuoteSynchronizer {
    inner: Arc<Inner>,
}

impl QuoteSynchronizer {
    pub fn new(
        pricing: Arc<dyn PricingProvider>,
        buffer: SharedBuffer,
        route: QuoteRoute,
        settings: QuoteSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                pricing,
                buffer,
                settings,
                state: Mutex::new(SyncState {
                    route,
                    change_ticket: 0,
                    latest_seq: 0,
                    in_flight: false,
                    error: None,
                    detached: false,
                }),
            }),
        }
    }

    /// Notify the synchronizer that the authoritative value changed.
    ///
    /// Starts a debounce timer; if no newer change arrives within the window,
    /// the buffer is read as it is *then* and a single request is issued.
    /// Any request already in flight is superseded right away: it was
    /// computed from a value that no longer exists.
    pub fn on_buffer_changed(&self) -> JoinHandle<Option<QuoteApplied>> {
        let ticket = {
            let mut state = lock(&self.inner.state);
            state.change_ticket += 1;
            if state.in_flight {
                state.latest_seq += 1;
                state.in_flight = false;
                debug!(superseded_by = state.latest_seq, "Edit superseded in-flight quote");
            }
            state.change_ticket
        };

        let deadline = Instant::now() + self.inner.settings.debounce;
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if !this.is_latest_change(ticket) {
                return None;
            }
            Some(this.sync_now().await)
        })
    }

    fn is_latest_change(&self, ticket: u64) -> bool {
        let state = lock(&self.inner.state);
        !state.detached && state.change_ticket == ticket
    }

    /// Issue a request for the current buffer immediately and apply the response.
    pub async fn sync_now(&self) -> QuoteApplied {
        let Some((seq, origin, request)) = self.issue() else {
            return QuoteApplied::Skipped;
        };

        debug!(
            seq = seq,
            provider = self.inner.pricing.name(),
            from = request.from_asset_id,
            to = request.to_asset_id,
            amount = %request.source_amount,
            "Quote issued"
        );

        let started = Instant::now();
        let timeout = self.inner.settings.timeout;
        let result = match tokio::time::timeout(timeout, self.inner.pricing.quote(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(QuoteError::Timeout(timeout.as_millis() as u64)),
        };

        debug!(
            seq = seq,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Quote response"
        );
        self.apply(seq, origin, result)
    }

    /// Reserve the next sequence number and build the request.
    ///
    /// Returns `None` (after resetting the derived side) when the
    /// authoritative amount is not positive. Either way any outstanding
    /// request is superseded.
    fn issue(&self) -> Option<(SeqNum, EditingMode, QuoteRequest)> {
        let mut buffer = lock(&self.inner.buffer);
        let mut state = lock(&self.inner.state);
        if state.detached {
            return None;
        }

        state.latest_seq += 1;
        state.error = None;

        let origin = buffer.mode();
        let source = buffer.authoritative().to_string();
        if !money::is_positive(&source) {
            state.in_flight = false;
            buffer.reset(origin.other());
            debug!(seq = state.latest_seq, amount = %source, "Quote skipped for non-positive amount");
            return None;
        }

        state.in_flight = true;
        let request = state.route.request_for(origin, source);
        Some((state.latest_seq, origin, request))
    }

    fn apply(
        &self,
        seq: SeqNum,
        origin: EditingMode,
        result: Result<QuoteResult, QuoteError>,
    ) -> QuoteApplied {
        let mut buffer = lock(&self.inner.buffer);
        let mut state = lock(&self.inner.state);

        if state.detached || seq != state.latest_seq {
            debug!(seq = seq, latest = state.latest_seq, "Discarding stale quote");
            return QuoteApplied::Discarded;
        }
        state.in_flight = false;

        if buffer.mode() != origin {
            debug!(seq = seq, origin = %origin, "Discarding quote issued before mode switch");
            return QuoteApplied::Discarded;
        }

        let derived = origin.other();
        let decimals = self.inner.settings.precision.fraction_digits(derived);
        let converted = result.and_then(|quote| {
            money::truncate_fraction(&quote.converted_amount, decimals).map_err(QuoteError::from)
        });

        match converted {
            Ok(value) => {
                info!(seq = seq, side = %derived, amount = %value, "Quote applied");
                buffer.set(derived, value);
                QuoteApplied::Applied
            }
            Err(e) => {
                warn!(seq = seq, code = e.code(), error = %e, "Quote failed, resetting derived amount");
                buffer.reset(derived);
                state.error = Some(e.clone());
                QuoteApplied::Failed(e)
            }
        }
    }

    /// Switch provider or asset pair. Outstanding requests are superseded.
    pub fn set_route(&self, route: QuoteRoute) {
        let mut state = lock(&self.inner.state);
        if state.route != route {
            state.route = route;
            state.latest_seq += 1;
            state.in_flight = false;
        }
    }

    /// Drop pending debounce timers and outstanding requests without issuing.
    pub fn cancel_pending(&self) {
        let mut state = lock(&self.inner.state);
        state.change_ticket += 1;
        state.latest_seq += 1;
        state.in_flight = false;
    }

    pub fn route(&self) -> QuoteRoute {
        lock(&self.inner.state).route
    }

    /// True from issuing a request until its (accepted) response or failure.
    pub fn is_quote_in_flight(&self) -> bool {
        lock(&self.inner.state).in_flight
    }

    /// Error of the latest request, cleared by the next issue.
    pub fn quote_error(&self) -> Option<QuoteError> {
        lock(&self.inner.state).error.clone()
    }

    pub fn clear_quote_error(&self) {
        lock(&self.inner.state).error = None;
    }

    /// Sequence number of the latest issued (or superseding) request.
    pub fn latest_seq(&self) -> SeqNum {
        lock(&self.inner.state).latest_seq
    }

    /// Stop all synchronization: pending timers and responses are dropped.
    pub fn detach(&self) {
        let mut state = lock(&self.inner.state);
        state.detached = true;
        state.latest_seq += 1;
        state.in_flight = false;
    }
}
