//! Transaction intents
//!
//! An intent is built fresh from the current amounts and the caller's
//! selection at the moment the user continues. Building it *is* the
//! validation step: a [`TransactionIntent`] value is always submittable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::address::AddressValidator;
use crate::amount::{AmountPair, EditingMode, Precision};
use crate::core_types::{BankAccountId, ProviderId, Token, TransactionKind, UserId};
use crate::money;

/// Caller-owned choices an intent is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub token: Token,
    #[serde(default)]
    pub destination_address: Option<String>,
    #[serde(default)]
    pub bank_account: Option<BankAccountId>,
}

impl Selection {
    pub fn new(user_id: UserId, provider_id: ProviderId, token: Token) -> Self {
        Self {
            user_id,
            provider_id,
            token,
            destination_address: None,
            bank_account: None,
        }
    }

    pub fn with_destination(mut self, address: impl Into<String>) -> Self {
        self.destination_address = Some(address.into());
        self
    }

    pub fn with_bank_account(mut self, bank_account: BankAccountId) -> Self {
        self.bank_account = Some(bank_account);
        self
    }
}

/// Validated description of the transaction to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionIntent {
    Transfer {
        destination_address: String,
        token_amount: Decimal,
        token: Token,
    },
    Buy {
        fiat_amount: Decimal,
        token: Token,
    },
    Sell {
        fiat_amount: Decimal,
        token: Token,
        bank_account: BankAccountId,
    },
}

impl TransactionIntent {
    /// Validate preconditions for `kind` and build the intent.
    ///
    /// Checks run type-specific first (destination, bank account), then the
    /// amount: transfers use the crypto side, buy and sell the fiat side.
    pub fn build(
        kind: TransactionKind,
        amounts: &AmountPair,
        selection: &Selection,
        precision: &Precision,
        validator: &AddressValidator,
    ) -> Result<Self, ValidationError> {
        let token = selection.token.clone();
        match kind {
            TransactionKind::Transfer => {
                let address = selection
                    .destination_address
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default();
                if address.is_empty() {
                    return Err(ValidationError::MissingAddress);
                }
                if !validator.is_valid(address, &token.chain) {
                    return Err(ValidationError::InvalidAddress {
                        chain: token.chain.clone(),
                    });
                }
                let token_amount = side_amount(amounts, EditingMode::Crypto, precision)?;
                Ok(TransactionIntent::Transfer {
                    destination_address: address.to_string(),
                    token_amount,
                    token,
                })
            }
            TransactionKind::Buy => {
                let fiat_amount = side_amount(amounts, EditingMode::Fiat, precision)?;
                Ok(TransactionIntent::Buy { fiat_amount, token })
            }
            TransactionKind::Sell => {
                let bank_account = selection
                    .bank_account
                    .ok_or(ValidationError::MissingBankAccount)?;
                let fiat_amount = side_amount(amounts, EditingMode::Fiat, precision)?;
                Ok(TransactionIntent::Sell {
                    fiat_amount,
                    token,
                    bank_account,
                })
            }
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionIntent::Transfer { .. } => TransactionKind::Transfer,
            TransactionIntent::Buy { .. } => TransactionKind::Buy,
            TransactionIntent::Sell { .. } => TransactionKind::Sell,
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            TransactionIntent::Transfer { token, .. }
            | TransactionIntent::Buy { token, .. }
            | TransactionIntent::Sell { token, .. } => token,
        }
    }

    /// Amount the user committed to (token amount for transfers, fiat otherwise).
    pub fn amount(&self) -> Decimal {
        match self {
            TransactionIntent::Transfer { token_amount, .. } => *token_amount,
            TransactionIntent::Buy { fiat_amount, .. }
            | TransactionIntent::Sell { fiat_amount, .. } => *fiat_amount,
        }
    }
}

fn side_amount(
    amounts: &AmountPair,
    side: EditingMode,
    precision: &Precision,
) -> Result<Decimal, ValidationError> {
    money::parse_positive(amounts.get(side), precision.fraction_digits(side))
        .map_err(ValidationError::from)
}
