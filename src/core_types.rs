//! Core types used throughout the engine
//!
//! Identifier aliases and the small value types every component shares.
//! They provide semantic meaning at call sites without wrapping costs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::ChainFamily;

/// User ID - the account the transaction is submitted on behalf of.
pub type UserId = u64;

/// Token ID as known by the pricing and transaction backends.
pub type TokenId = u32;

/// Fiat currency asset ID (e.g. NGN, KES) on the pricing provider.
pub type FiatAssetId = u32;

/// Pricing / ramp provider ID.
pub type ProviderId = u32;

/// Bank account ID registered for off-ramp payouts.
pub type BankAccountId = u64;

/// Sequence number for quote ordering
pub type SeqNum = u64;

/// A decimal amount kept as text to avoid float rounding during digit entry.
pub type DecimalString = String;

/// Token selected for the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub symbol: String,
    /// Chain the token lives on; selects the address format for transfers.
    pub chain: ChainFamily,
}

impl Token {
    pub fn new(id: TokenId, symbol: impl Into<String>, chain: ChainFamily) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            chain,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Transaction type chosen on the continue action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Transfer,
    Buy,
    Sell,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "TRANSFER",
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
