//! Transaction Submitter
//!
//! Drives the submission FSM: validate the intent, call the matching
//! gateway endpoint, record the outcome until the user acknowledges it.
//!
//! # Safety Invariants
//!
//! 1. **At most one in flight**: `submit` only starts from `IDLE`; any other
//!    state makes it a no-op that returns the current state.
//! 2. **Fail closed**: an invalid intent goes straight to `FAILED` and the
//!    gateway is never called.
//! 3. **Unknown is not failed**: a timed-out or abandoned call is reported as
//!    status-unknown, never as a plain failure, since it may still land.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::{GatewayError, SubmissionError};
use super::gateway::{BuyOrder, SellOrder, TransactionGateway, TransferOrder};
use super::intent::{Selection, TransactionIntent};
use super::state::{Outcome, SubmissionReceipt, SubmissionState};
use crate::address::AddressValidator;
use crate::amount::{AmountPair, Precision};
use crate::core_types::TransactionKind;
use crate::util::lock;

/// Marks the call abandoned if the submit future is dropped mid-flight.
struct InFlightGuard<'a> {
    state: &'a Mutex<SubmissionState>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Submission dropped while in flight");
            *lock(self.state) = SubmissionState::Failed(SubmissionError::StatusUnknown);
        }
    }
}

/// Submission FSM for one engine instance.
pub struct TransactionSubmitter {
    gateway: Arc<dyn TransactionGateway>,
    validator: AddressValidator,
    precision: Precision,
    timeout: Duration,
    state: Mutex<SubmissionState>,
}

impl TransactionSubmitter {
    pub fn new(
        gateway: Arc<dyn TransactionGateway>,
        validator: AddressValidator,
        precision: Precision,
        timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            validator,
            precision,
            timeout,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SubmissionState {
        lock(&self.state).clone()
    }

    pub fn validator(&self) -> &AddressValidator {
        &self.validator
    }

    fn transition(&self, next: SubmissionState) -> SubmissionState {
        let mut state = lock(&self.state);
        debug!(from = state.as_str(), to = next.as_str(), "Submission transition");
        *state = next.clone();
        next
    }

    /// Validate and submit a `kind` transaction built from `amounts` and `selection`.
    ///
    /// Returns the state reached. Outside `IDLE` this is a no-op returning the
    /// current state.
    pub async fn submit(
        &self,
        kind: TransactionKind,
        amounts: &AmountPair,
        selection: &Selection,
    ) -> SubmissionState {
        {
            let mut state = lock(&self.state);
            if *state != SubmissionState::Idle {
                debug!(kind = %kind, state = state.as_str(), "Submit ignored: not idle");
                return state.clone();
            }
            *state = SubmissionState::Validating;
        }

        let intent = match TransactionIntent::build(
            kind,
            amounts,
            selection,
            &self.precision,
            &self.validator,
        ) {
            Ok(intent) => intent,
            Err(e) => {
                info!(kind = %kind, code = e.code(), "Submission rejected by validation");
                return self.transition(SubmissionState::Failed(e.into()));
            }
        };

        self.transition(SubmissionState::InFlight { kind });
        let mut guard = InFlightGuard {
            state: &self.state,
            armed: true,
        };

        info!(
            kind = %kind,
            user_id = selection.user_id,
            token = %intent.token(),
            amount = %intent.amount(),
            gateway = self.gateway.name(),
            "Submitting transaction"
        );

        let submitted_at = Utc::now();
        let result = tokio::time::timeout(self.timeout, self.dispatch(&intent, selection)).await;
        guard.armed = false;

        let next = match result {
            Ok(Ok(outcome)) if outcome.success => {
                info!(
                    kind = %kind,
                    tx_hash = outcome.transaction_hash.as_deref().unwrap_or("-"),
                    "Transaction submitted"
                );
                SubmissionState::Succeeded(SubmissionReceipt {
                    kind,
                    amount: intent.amount().to_string(),
                    token_symbol: intent.token().symbol.clone(),
                    outcome,
                    submitted_at,
                })
            }
            Ok(Ok(outcome)) => {
                warn!(
                    kind = %kind,
                    error = outcome.error_message.as_deref().unwrap_or("-"),
                    "Transaction rejected by backend"
                );
                SubmissionState::Failed(SubmissionError::Failed)
            }
            Ok(Err(e)) => {
                error!(kind = %kind, error = %e, "Transaction gateway error");
                SubmissionState::Failed(SubmissionError::Failed)
            }
            Err(_) => {
                error!(
                    kind = %kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Transaction timed out, outcome unknown"
                );
                SubmissionState::Failed(SubmissionError::StatusUnknown)
            }
        };
        self.transition(next)
    }

    async fn dispatch(
        &self,
        intent: &TransactionIntent,
        selection: &Selection,
    ) -> Result<Outcome, GatewayError> {
        match intent {
            TransactionIntent::Transfer {
                destination_address,
                token_amount,
                token,
            } => {
                let order = TransferOrder {
                    user_id: selection.user_id,
                    token_id: token.id,
                    amount: *token_amount,
                    destination_address: destination_address.clone(),
                };
                self.gateway.send_crypto(&order).await
            }
            TransactionIntent::Buy { fiat_amount, token } => {
                let order = BuyOrder {
                    user_id: selection.user_id,
                    provider_id: selection.provider_id,
                    token_id: token.id,
                    fiat_amount: *fiat_amount,
                };
                self.gateway.create_on_ramp(&order).await
            }
            TransactionIntent::Sell {
                fiat_amount,
                token,
                bank_account,
            } => {
                let order = SellOrder {
                    user_id: selection.user_id,
                    provider_id: selection.provider_id,
                    token_id: token.id,
                    fiat_amount: *fiat_amount,
                    bank_account: *bank_account,
                };
                self.gateway.create_off_ramp(&order).await
            }
        }
    }

    /// Acknowledge a terminal result and re-arm.
    ///
    /// Returns `false` (and changes nothing) outside `SUCCEEDED`/`FAILED`.
    pub fn acknowledge(&self) -> bool {
        let mut state = lock(&self.state);
        if !state.is_terminal() {
            return false;
        }
        debug!(from = state.as_str(), "Submission acknowledged");
        *state = SubmissionState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ChainFamily;
    use crate::core_types::Token;
    use crate::submission::error::ValidationError;
    use crate::submission::gateway::MockGateway;

    const EVM_ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn setup() -> (Arc<MockGateway>, Arc<TransactionSubmitter>) {
        let gateway = Arc::new(MockGateway::new());
        let submitter = Arc::new(TransactionSubmitter::new(
            gateway.clone(),
            AddressValidator::with_defaults(),
            Precision::default(),
            Duration::from_secs(30),
        ));
        (gateway, submitter)
    }

    fn selection() -> Selection {
        Selection::new(1001, 2, Token::new(7, "USDC", ChainFamily::EVM))
    }

    fn amounts() -> AmountPair {
        AmountPair {
            fiat: "12.5".into(),
            crypto: "0.0034".into(),
        }
    }

    async fn wait_for_gateway(gateway: &MockGateway, n: usize) {
        for _ in 0..1000 {
            if gateway.total_calls() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("gateway never called");
    }

    #[tokio::test]
    async fn test_transfer_success() {
        let (gateway, submitter) = setup();
        let sel = selection().with_destination(EVM_ADDR);

        let state = submitter
            .submit(TransactionKind::Transfer, &amounts(), &sel)
            .await;
        let SubmissionState::Succeeded(receipt) = state else {
            panic!("expected success, got {:?}", state);
        };
        assert_eq!(receipt.amount, "0.0034");
        assert_eq!(receipt.token_symbol, "USDC");
        assert_eq!(receipt.outcome.transaction_hash.as_deref(), Some("0xfeed"));

        let order = gateway.last_transfer().unwrap();
        assert_eq!(order.destination_address, EVM_ADDR);
        assert_eq!(order.user_id, 1001);
        assert_eq!(order.token_id, 7);

        assert!(submitter.acknowledge());
        assert_eq!(submitter.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_empty_address_fails_without_call() {
        let (gateway, submitter) = setup();
        let sel = selection().with_destination("");

        let state = submitter
            .submit(TransactionKind::Transfer, &amounts(), &sel)
            .await;
        assert_eq!(
            state,
            SubmissionState::Failed(ValidationError::MissingAddress.into())
        );
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_address_fails_without_call() {
        let (gateway, submitter) = setup();
        let sel = selection().with_destination("0xZZZ");

        let state = submitter
            .submit(TransactionKind::Transfer, &amounts(), &sel)
            .await;
        assert!(matches!(
            state,
            SubmissionState::Failed(SubmissionError::Validation(
                ValidationError::InvalidAddress { .. }
            ))
        ));
        assert_eq!(gateway.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_sell_without_bank_account() {
        let (gateway, submitter) = setup();

        let state = submitter
            .submit(TransactionKind::Sell, &amounts(), &selection())
            .await;
        let SubmissionState::Failed(reason) = state else {
            panic!("expected failure");
        };
        assert_eq!(reason.user_message(), "Bank account required");
        assert_eq!(gateway.sell_count(), 0);
    }

    #[tokio::test]
    async fn test_sell_with_bank_account() {
        let (gateway, submitter) = setup();
        let sel = selection().with_bank_account(88);

        let state = submitter.submit(TransactionKind::Sell, &amounts(), &sel).await;
        assert!(matches!(state, SubmissionState::Succeeded(_)));
        let order = gateway.last_sell().unwrap();
        assert_eq!(order.bank_account, 88);
        assert_eq!(order.fiat_amount.to_string(), "12.5");
    }

    #[tokio::test]
    async fn test_zero_amount_fails_closed() {
        let (gateway, submitter) = setup();
        let state = submitter
            .submit(TransactionKind::Buy, &AmountPair::default(), &selection())
            .await;
        assert_eq!(
            state,
            SubmissionState::Failed(ValidationError::NonPositiveAmount.into())
        );
        assert_eq!(gateway.buy_count(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_noop() {
        let (gateway, submitter) = setup();
        gateway.set_hold(true);

        let first = {
            let submitter = submitter.clone();
            tokio::spawn(async move {
                submitter
                    .submit(TransactionKind::Buy, &amounts(), &selection())
                    .await
            })
        };
        wait_for_gateway(&gateway, 1).await;
        assert_eq!(
            submitter.state(),
            SubmissionState::InFlight {
                kind: TransactionKind::Buy
            }
        );

        let second = submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert_eq!(
            second,
            SubmissionState::InFlight {
                kind: TransactionKind::Buy
            }
        );
        assert_eq!(gateway.buy_count(), 1);

        gateway.release();
        assert!(matches!(
            first.await.unwrap(),
            SubmissionState::Succeeded(_)
        ));
        assert_eq!(gateway.buy_count(), 1);
    }

    #[tokio::test]
    async fn test_terminal_state_blocks_until_acknowledged() {
        let (gateway, submitter) = setup();
        submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;

        let again = submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert!(matches!(again, SubmissionState::Succeeded(_)));
        assert_eq!(gateway.buy_count(), 1);

        assert!(submitter.acknowledge());
        assert!(!submitter.acknowledge());
        submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert_eq!(gateway.buy_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_generic_failure() {
        let (gateway, submitter) = setup();
        gateway.set_fail_transport(true);

        let state = submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert_eq!(state, SubmissionState::Failed(SubmissionError::Failed));
    }

    #[tokio::test]
    async fn test_backend_rejection_is_generic_failure() {
        let (gateway, submitter) = setup();
        gateway.set_reject(true);

        let state = submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert_eq!(state, SubmissionState::Failed(SubmissionError::Failed));
        assert!(submitter.acknowledge());
        assert_eq!(submitter.state(), SubmissionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_status_unknown() {
        let (gateway, submitter) = setup();
        gateway.set_hold(true);

        let state = submitter
            .submit(TransactionKind::Buy, &amounts(), &selection())
            .await;
        assert_eq!(state, SubmissionState::Failed(SubmissionError::StatusUnknown));
    }

    #[tokio::test]
    async fn test_dropped_submit_marks_status_unknown() {
        let (gateway, submitter) = setup();
        gateway.set_hold(true);

        let task = {
            let submitter = submitter.clone();
            tokio::spawn(async move {
                submitter
                    .submit(TransactionKind::Buy, &amounts(), &selection())
                    .await
            })
        };
        wait_for_gateway(&gateway, 1).await;
        task.abort();
        let _ = task.await;

        assert_eq!(
            submitter.state(),
            SubmissionState::Failed(SubmissionError::StatusUnknown)
        );
    }

    #[tokio::test]
    async fn test_acknowledge_outside_terminal_is_noop() {
        let (_gateway, submitter) = setup();
        assert!(!submitter.acknowledge());
        assert_eq!(submitter.state(), SubmissionState::Idle);
    }
}
