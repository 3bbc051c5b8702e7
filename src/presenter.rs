//! Result presentation
//!
//! Maps the submission state to what the result view renders. Pure: no
//! state, no side effects.

use serde::Serialize;

use crate::core_types::{DecimalString, TransactionKind};
use crate::submission::SubmissionState;

/// Where a failure reason is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presentation {
    /// Next to the field that needs fixing
    Inline,
    /// Blocking dialog that must be acknowledged
    Modal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessDetails {
    pub kind: TransactionKind,
    pub amount: DecimalString,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayState {
    None,
    Loading,
    Success(SuccessDetails),
    Failure {
        reason: String,
        presentation: Presentation,
    },
}

pub fn present(state: &SubmissionState) -> DisplayState {
    match state {
        SubmissionState::Idle => DisplayState::None,
        SubmissionState::Validating | SubmissionState::InFlight { .. } => DisplayState::Loading,
        SubmissionState::Succeeded(receipt) => DisplayState::Success(SuccessDetails {
            kind: receipt.kind,
            amount: receipt.amount.clone(),
            token_symbol: receipt.token_symbol.clone(),
            transaction_hash: receipt.outcome.transaction_hash.clone(),
            transaction_url: receipt.outcome.transaction_url.clone(),
        }),
        SubmissionState::Failed(e) => DisplayState::Failure {
            reason: e.user_message(),
            presentation: if e.is_validation() {
                Presentation::Inline
            } else {
                Presentation::Modal
            },
        },
    }
}
