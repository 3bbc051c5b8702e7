//! Order cancellation
//!
//! Cancels a pending on/off-ramp order from an order-detail view. Runs
//! outside the submit FSM: it neither blocks nor is blocked by a submission.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::error::SubmissionError;
use super::gateway::TransactionGateway;
use super::state::Outcome;
use crate::core_types::TransactionKind;

pub struct OrderCanceller {
    gateway: Arc<dyn TransactionGateway>,
    timeout: Duration,
}

impl OrderCanceller {
    pub fn new(gateway: Arc<dyn TransactionGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Ask the backend to cancel `transaction_id`.
    ///
    /// Any transport error, rejection or timeout collapses into
    /// [`SubmissionError::CancelFailed`].
    pub async fn cancel(
        &self,
        transaction_id: &str,
        kind: TransactionKind,
    ) -> Result<Outcome, SubmissionError> {
        if transaction_id.trim().is_empty() {
            warn!(kind = %kind, "Cancel requested without transaction id");
            return Err(SubmissionError::CancelFailed);
        }

        let call = self.gateway.cancel_transaction(transaction_id, kind);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(outcome)) if outcome.success => {
                info!(transaction_id, kind = %kind, "Order cancelled");
                Ok(outcome)
            }
            Ok(Ok(outcome)) => {
                warn!(
                    transaction_id,
                    kind = %kind,
                    error = outcome.error_message.as_deref().unwrap_or("-"),
                    "Cancel rejected"
                );
                Err(SubmissionError::CancelFailed)
            }
            Ok(Err(e)) => {
                warn!(transaction_id, kind = %kind, error = %e, "Cancel failed");
                Err(SubmissionError::CancelFailed)
            }
            Err(_) => {
                warn!(transaction_id, kind = %kind, "Cancel timed out");
                Err(SubmissionError::CancelFailed)
            }
        }
    }
}
