//! Submission Error Types
//!
//! - [`ValidationError`]: local pre-flight rejection, never reaches the network
//! - [`GatewayError`]: raw collaborator failure, logged but never shown
//! - [`SubmissionError`]: the only class surfaced to the user

use thiserror::Error;

use crate::address::ChainFamily;
use crate::money::MoneyError;

/// Pre-flight validation errors (user-facing messages).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a destination address")]
    MissingAddress,

    #[error("Enter a valid {chain} address")]
    InvalidAddress { chain: ChainFamily },

    #[error("Bank account required")]
    MissingBankAccount,

    #[error("Enter an amount greater than zero")]
    NonPositiveAmount,

    #[error("Enter a valid amount")]
    InvalidAmount(MoneyError),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingAddress => "MISSING_ADDRESS",
            ValidationError::InvalidAddress { .. } => "INVALID_ADDRESS",
            ValidationError::MissingBankAccount => "MISSING_BANK_ACCOUNT",
            ValidationError::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            ValidationError::InvalidAmount(_) => "INVALID_AMOUNT",
        }
    }
}

impl From<MoneyError> for ValidationError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::InvalidAmount => ValidationError::NonPositiveAmount,
            other => ValidationError::InvalidAmount(other),
        }
    }
}

/// Raw failure reported by the transaction backend or its transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
}

/// User-facing submission failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transaction failed. Please try again.")]
    Failed,

    /// The call timed out or was abandoned; it may still land server-side
    #[error("Transaction status unknown. Check your history before trying again.")]
    StatusUnknown,

    #[error("Could not cancel the transaction. Please try again.")]
    CancelFailed,
}

impl SubmissionError {
    /// Get the error code for logs and analytics
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Validation(e) => e.code(),
            SubmissionError::Failed => "SUBMISSION_FAILED",
            SubmissionError::StatusUnknown => "STATUS_UNKNOWN",
            SubmissionError::CancelFailed => "CANCEL_FAILED",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmissionError::Validation(_))
    }

    /// Short human-readable reason for the result view.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
