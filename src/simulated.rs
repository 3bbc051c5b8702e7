//! In-memory collaborators
//!
//! [`FixedRatePricing`] and [`SimulatedGateway`] stand in for the remote
//! pricing and transaction services in the demo binary and integration
//! tests. Enabled by the `simulated` feature.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core_types::{FiatAssetId, TokenId, TransactionKind};
use crate::quote::{PricingProvider, QuoteError, QuoteRequest, QuoteResult};
use crate::submission::{
    BuyOrder, GatewayError, Outcome, SellOrder, TransactionGateway, TransferOrder,
};
use crate::util::lock;

/// Converts at fixed per-token prices.
#[derive(Debug, Default)]
pub struct FixedRatePricing {
    /// (fiat asset, token) → fiat price of one token
    prices: FxHashMap<(FiatAssetId, TokenId), Decimal>,
    latency: Duration,
}

impl FixedRatePricing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fiat price of one `token` (both directions).
    pub fn with_price(mut self, fiat: FiatAssetId, token: TokenId, price: Decimal) -> Self {
        self.prices.insert((fiat, token), price);
        self
    }

    /// Delay every quote by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn convert(&self, request: &QuoteRequest) -> Result<Decimal, QuoteError> {
        let amount = crate::money::parse_amount(&request.source_amount)?;
        let pair = (request.from_asset_id, request.to_asset_id);

        if let Some(price) = self.prices.get(&pair) {
            // fiat → token
            return amount
                .checked_div(*price)
                .ok_or_else(|| QuoteError::Rejected("price unavailable".into()));
        }
        if let Some(price) = self.prices.get(&(pair.1, pair.0)) {
            // token → fiat
            return amount
                .checked_mul(*price)
                .ok_or_else(|| QuoteError::Rejected("amount too large".into()));
        }
        Err(QuoteError::Rejected(format!(
            "no price for {} → {}",
            request.from_asset_id, request.to_asset_id
        )))
    }
}

#[async_trait]
impl PricingProvider for FixedRatePricing {
    fn name(&self) -> &'static str {
        "fixed_rate"
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let converted = self.convert(request)?;
        Ok(QuoteResult::new(converted.normalize().to_string()))
    }
}

/// One transaction accepted by [`SimulatedGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTx {
    pub transaction_id: String,
    pub kind: TransactionKind,
    pub transaction_hash: String,
    pub cancelled: bool,
}

/// Accepts every order and mints a random transaction hash.
#[derive(Debug)]
pub struct SimulatedGateway {
    explorer_base: String,
    latency: Duration,
    ledger: Mutex<Vec<SimulatedTx>>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new("https://explorer.example/tx")
    }
}

impl SimulatedGateway {
    pub fn new(explorer_base: impl Into<String>) -> Self {
        Self {
            explorer_base: explorer_base.into(),
            latency: Duration::ZERO,
            ledger: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Transactions accepted so far, oldest first.
    pub fn transactions(&self) -> Vec<SimulatedTx> {
        lock(&self.ledger).clone()
    }

    async fn accept(&self, kind: TransactionKind) -> Result<Outcome, GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let tx_id = uuid::Uuid::new_v4();
        let hash = format!("0x{:x}", tx_id.simple());
        let transaction_id = tx_id.to_string();
        debug!(kind = %kind, transaction_id = %transaction_id, "Simulated transaction accepted");

        lock(&self.ledger).push(SimulatedTx {
            transaction_id: transaction_id.clone(),
            kind,
            transaction_hash: hash.clone(),
            cancelled: false,
        });

        Ok(Outcome {
            success: true,
            transaction_url: Some(format!("{}/{}", self.explorer_base, hash)),
            transaction_hash: Some(hash),
            transaction_id: Some(transaction_id),
            error_message: None,
        })
    }
}

#[async_trait]
impl TransactionGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn send_crypto(&self, _order: &TransferOrder) -> Result<Outcome, GatewayError> {
        self.accept(TransactionKind::Transfer).await
    }

    async fn create_on_ramp(&self, _order: &BuyOrder) -> Result<Outcome, GatewayError> {
        self.accept(TransactionKind::Buy).await
    }

    async fn create_off_ramp(&self, _order: &SellOrder) -> Result<Outcome, GatewayError> {
        self.accept(TransactionKind::Sell).await
    }

    async fn cancel_transaction(
        &self,
        transaction_id: &str,
        kind: TransactionKind,
    ) -> Result<Outcome, GatewayError> {
        let mut ledger = lock(&self.ledger);
        match ledger
            .iter_mut()
            .find(|tx| tx.transaction_id == transaction_id && tx.kind == kind)
        {
            Some(tx) if !tx.cancelled => {
                tx.cancelled = true;
                Ok(Outcome {
                    transaction_id: Some(tx.transaction_id.clone()),
                    ..Outcome::succeeded()
                })
            }
            Some(_) => Ok(Outcome::rejected("Transaction already cancelled")),
            None => Err(GatewayError::Backend {
                status: 404,
                message: format!("unknown transaction {}", transaction_id),
            }),
        }
    }
}
