//! Submission FSM State Definitions
//!
//! ```text
//! IDLE → VALIDATING → IN_FLIGHT → SUCCEEDED
//!             ↓            ↓
//!           FAILED ←───────┘        (acknowledge: SUCCEEDED | FAILED → IDLE)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::SubmissionError;
use crate::core_types::{DecimalString, TransactionKind};

/// Result reported by the transaction backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_url: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Outcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// What a successful submission keeps for the result view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub kind: TransactionKind,
    pub amount: DecimalString,
    pub token_symbol: String,
    pub outcome: Outcome,
    pub submitted_at: DateTime<Utc>,
}

/// Submission FSM States
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// Armed: ready to accept a submit
    Idle,

    /// Building and checking the intent
    Validating,

    /// External call issued; a second submit is a no-op
    InFlight { kind: TransactionKind },

    /// Terminal: backend accepted the transaction
    Succeeded(SubmissionReceipt),

    /// Terminal: validation, transport or backend failure
    Failed(SubmissionError),
}

impl SubmissionState {
    /// Check if this is a terminal state (waiting for acknowledgement)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
        )
    }

    /// Check if a submission is being validated or awaited
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SubmissionState::Validating | SubmissionState::InFlight { .. }
        )
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "IDLE",
            SubmissionState::Validating => "VALIDATING",
            SubmissionState::InFlight { .. } => "IN_FLIGHT",
            SubmissionState::Succeeded(_) => "SUCCEEDED",
            SubmissionState::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
