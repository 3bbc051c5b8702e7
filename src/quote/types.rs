//! Quote request/response types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::EditingMode;
use crate::core_types::{DecimalString, FiatAssetId, ProviderId, TokenId};
use crate::money::MoneyError;

/// Conversion request sent to the pricing provider.
///
/// Direction is carried by the asset order alone: `source_amount` is always
/// denominated in `from_asset_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub provider_id: ProviderId,
    pub from_asset_id: u32,
    pub to_asset_id: u32,
    pub source_amount: DecimalString,
}

/// Successful quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub converted_amount: DecimalString,
}

impl QuoteResult {
    pub fn new(converted_amount: impl Into<DecimalString>) -> Self {
        Self {
            converted_amount: converted_amount.into(),
        }
    }
}

/// Provider and asset pair the synchronizer quotes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRoute {
    pub provider_id: ProviderId,
    pub fiat_asset_id: FiatAssetId,
    pub token_id: TokenId,
}

impl QuoteRoute {
    /// Request converting the authoritative `origin` side into the other one.
    pub fn request_for(&self, origin: EditingMode, source_amount: DecimalString) -> QuoteRequest {
        let (from_asset_id, to_asset_id) = match origin {
            EditingMode::Fiat => (self.fiat_asset_id, self.token_id),
            EditingMode::Crypto => (self.token_id, self.fiat_asset_id),
        };
        QuoteRequest {
            provider_id: self.provider_id,
            from_asset_id,
            to_asset_id,
            source_amount,
        }
    }
}

/// Quote failures. Absorbed by the synchronizer, never propagated to callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Provider rejected quote: {0}")]
    Rejected(String),

    #[error("Pricing transport error: {0}")]
    Transport(String),

    #[error("Quote timed out after {0} ms")]
    Timeout(u64),

    #[error("Malformed converted amount: {0}")]
    InvalidAmount(#[from] MoneyError),
}

impl QuoteError {
    pub fn code(&self) -> &'static str {
        match self {
            QuoteError::Rejected(_) => "QUOTE_REJECTED",
            QuoteError::Transport(_) => "QUOTE_TRANSPORT",
            QuoteError::Timeout(_) => "QUOTE_TIMEOUT",
            QuoteError::InvalidAmount(_) => "QUOTE_INVALID_AMOUNT",
        }
    }

    /// Short inline message for the entry screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            QuoteError::Timeout(_) => "Price is taking too long. Keep typing to retry.",
            _ => "Couldn't fetch a price for this amount.",
        }
    }
}
