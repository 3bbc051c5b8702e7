//! Amount Session
//!
//! One engine instance per entry screen. Owns the amount buffer and wires the
//! entry controller, quote synchronizer and transaction submitter together:
//!
//! ```text
//! keypad/text ─▶ DigitEntryController ─▶ AmountBuffer ─(changed)─▶ QuoteSynchronizer
//!                                             │
//!                    continue_with(kind) ─────┴─▶ TransactionSubmitter ─▶ present()
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::address::AddressValidator;
use crate::amount::{AmountBuffer, AmountPair, DigitEntryController, EditingMode, KeypadKey};
use crate::core_types::{BankAccountId, FiatAssetId, ProviderId, Token, TransactionKind};
use crate::presenter::{DisplayState, present};
use crate::quote::{
    PricingProvider, QuoteApplied, QuoteError, QuoteRoute, QuoteSettings, QuoteSynchronizer,
    SharedBuffer,
};
use crate::submission::{
    OrderCanceller, Outcome, Selection, SubmissionError, SubmissionState, TransactionGateway,
    TransactionSubmitter,
};
use crate::util::lock;

/// Everything a session needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub quote: QuoteSettings,
    /// Upper bound on a submit or cancel call
    pub submit_timeout: Duration,
    pub validator: AddressValidator,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quote: QuoteSettings::default(),
            submit_timeout: Duration::from_secs(60),
            validator: AddressValidator::with_defaults(),
        }
    }
}

pub struct AmountSession {
    buffer: SharedBuffer,
    controller: DigitEntryController,
    synchronizer: QuoteSynchronizer,
    submitter: TransactionSubmitter,
    canceller: OrderCanceller,
    selection: Mutex<Selection>,
    fiat_asset_id: FiatAssetId,
    /// Debounce task of the most recent change
    pending_quote: Mutex<Option<JoinHandle<Option<QuoteApplied>>>>,
}

impl AmountSession {
    pub fn new(
        pricing: Arc<dyn PricingProvider>,
        gateway: Arc<dyn TransactionGateway>,
        selection: Selection,
        fiat_asset_id: FiatAssetId,
        settings: SessionSettings,
    ) -> Self {
        Self::with_draft(pricing, gateway, selection, fiat_asset_id, settings, None)
    }

    /// Session whose fiat side starts from a default or drafted amount.
    ///
    /// No quote is requested until [`refresh_quote`](Self::refresh_quote) or
    /// the first edit.
    pub fn with_draft(
        pricing: Arc<dyn PricingProvider>,
        gateway: Arc<dyn TransactionGateway>,
        selection: Selection,
        fiat_asset_id: FiatAssetId,
        settings: SessionSettings,
        fiat_default: Option<&str>,
    ) -> Self {
        let precision = settings.quote.precision;
        let controller = DigitEntryController::new(precision);
        let buffer: SharedBuffer = Arc::new(Mutex::new(controller.seed(fiat_default)));
        let route = QuoteRoute {
            provider_id: selection.provider_id,
            fiat_asset_id,
            token_id: selection.token.id,
        };
        let synchronizer =
            QuoteSynchronizer::new(pricing, buffer.clone(), route, settings.quote);
        let submitter = TransactionSubmitter::new(
            gateway.clone(),
            settings.validator,
            precision,
            settings.submit_timeout,
        );
        let canceller = OrderCanceller::new(gateway, settings.submit_timeout);

        info!(
            user_id = selection.user_id,
            provider_id = selection.provider_id,
            token = %selection.token,
            fiat_asset_id,
            "Amount session opened"
        );

        Self {
            buffer,
            controller,
            synchronizer,
            submitter,
            canceller,
            selection: Mutex::new(selection),
            fiat_asset_id,
            pending_quote: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // Entry
    // ------------------------------------------------------------------

    fn edit(&self, op: impl FnOnce(&DigitEntryController, &mut AmountBuffer) -> bool) -> bool {
        let changed = {
            let mut buffer = lock(&self.buffer);
            op(&self.controller, &mut buffer)
        };
        if changed {
            self.refresh_quote();
        }
        changed
    }

    pub fn press_digit(&self, digit: u8) -> bool {
        self.edit(|c, b| c.press_digit(b, digit))
    }

    pub fn press_decimal_point(&self) -> bool {
        self.edit(|c, b| c.press_decimal_point(b))
    }

    pub fn press_delete(&self) -> bool {
        self.edit(|c, b| c.press_delete(b))
    }

    pub fn press(&self, key: KeypadKey) -> bool {
        match key {
            KeypadKey::Clear => self.clear(),
            other => self.edit(|c, b| c.press(b, other)),
        }
    }

    pub fn set_text(&self, text: &str) -> bool {
        self.edit(|c, b| c.set_text(b, text))
    }

    /// Reset both sides and drop any pending quote.
    pub fn clear(&self) -> bool {
        let changed = {
            let mut buffer = lock(&self.buffer);
            self.controller.clear(&mut buffer)
        };
        self.synchronizer.cancel_pending();
        changed
    }

    /// Change which side is typed. Never requests a quote.
    pub fn switch_mode(&self, mode: EditingMode) -> bool {
        let changed = lock(&self.buffer).switch_mode(mode);
        if changed {
            debug!(mode = %mode, "Editing mode switched");
        }
        changed
    }

    pub fn toggle_mode(&self) -> EditingMode {
        let mode = lock(&self.buffer).toggle_mode();
        debug!(mode = %mode, "Editing mode switched");
        mode
    }

    pub fn mode(&self) -> EditingMode {
        lock(&self.buffer).mode()
    }

    pub fn amounts(&self) -> AmountPair {
        lock(&self.buffer).amounts().clone()
    }

    // ------------------------------------------------------------------
    // Quotes
    // ------------------------------------------------------------------

    /// Schedule a debounced quote for the current buffer.
    pub fn refresh_quote(&self) {
        let handle = self.synchronizer.on_buffer_changed();
        *lock(&self.pending_quote) = Some(handle);
    }

    /// Wait for the most recently scheduled quote to settle.
    ///
    /// `None` when nothing is pending or the attempt was superseded.
    pub async fn wait_for_quote(&self) -> Option<QuoteApplied> {
        let handle = lock(&self.pending_quote).take()?;
        match handle.await {
            Ok(applied) => applied,
            Err(e) => {
                warn!(error = %e, "Quote task ended abnormally");
                None
            }
        }
    }

    pub fn is_quote_in_flight(&self) -> bool {
        self.synchronizer.is_quote_in_flight()
    }

    pub fn quote_error(&self) -> Option<QuoteError> {
        self.synchronizer.quote_error()
    }

    fn reroute(&self) {
        let route = {
            let selection = lock(&self.selection);
            QuoteRoute {
                provider_id: selection.provider_id,
                fiat_asset_id: self.fiat_asset_id,
                token_id: selection.token.id,
            }
        };
        if route != self.synchronizer.route() {
            self.synchronizer.set_route(route);
            self.refresh_quote();
        }
    }

    /// Pick another token; the derived side is re-quoted.
    pub fn select_token(&self, token: Token) {
        info!(token = %token, "Token selected");
        lock(&self.selection).token = token;
        self.reroute();
    }

    /// Pick another ramp provider; the derived side is re-quoted.
    pub fn select_provider(&self, provider_id: ProviderId) {
        info!(provider_id, "Provider selected");
        lock(&self.selection).provider_id = provider_id;
        self.reroute();
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    pub fn set_destination(&self, address: impl Into<String>) {
        lock(&self.selection).destination_address = Some(address.into());
    }

    pub fn set_bank_account(&self, bank_account: BankAccountId) {
        lock(&self.selection).bank_account = Some(bank_account);
    }

    pub fn selection(&self) -> Selection {
        lock(&self.selection).clone()
    }

    /// Submit a `kind` transaction for the current amounts.
    pub async fn continue_with(&self, kind: TransactionKind) -> DisplayState {
        let amounts = self.amounts();
        let selection = self.selection();
        let state = self.submitter.submit(kind, &amounts, &selection).await;
        present(&state)
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submitter.state()
    }

    pub fn display_state(&self) -> DisplayState {
        present(&self.submitter.state())
    }

    /// Dismiss a success or failure result.
    pub fn acknowledge(&self) -> bool {
        self.submitter.acknowledge()
    }

    pub async fn cancel_order(
        &self,
        transaction_id: &str,
        kind: TransactionKind,
    ) -> Result<Outcome, SubmissionError> {
        self.canceller.cancel(transaction_id, kind).await
    }

    /// Stop quoting; pending timers and responses are dropped.
    pub fn close(&self) {
        self.synchronizer.detach();
        debug!("Amount session closed");
    }
}

impl Drop for AmountSession {
    fn drop(&mut self) {
        self.synchronizer.detach();
    }
}
