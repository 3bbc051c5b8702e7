//! Transaction Gateway
//!
//! The backend endpoints the submitter calls, injected as a trait object so
//! the engine never holds process-wide clients.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::GatewayError;
use super::state::Outcome;
use crate::core_types::{BankAccountId, ProviderId, TokenId, TransactionKind, UserId};

/// On-chain token transfer to an external address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOrder {
    pub user_id: UserId,
    pub token_id: TokenId,
    pub amount: Decimal,
    pub destination_address: String,
}

/// Fiat → token purchase through a ramp provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyOrder {
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub token_id: TokenId,
    pub fiat_amount: Decimal,
}

/// Token → fiat sale paid out to a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellOrder {
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub token_id: TokenId,
    pub fiat_amount: Decimal,
    pub bank_account: BankAccountId,
}

/// External transaction collaborator.
///
/// `Ok(outcome)` with `success == false` is an application-level rejection;
/// `Err` is a transport or backend failure.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    /// Get gateway name for logging
    fn name(&self) -> &'static str;

    async fn send_crypto(&self, order: &TransferOrder) -> Result<Outcome, GatewayError>;

    async fn create_on_ramp(&self, order: &BuyOrder) -> Result<Outcome, GatewayError>;

    async fn create_off_ramp(&self, order: &SellOrder) -> Result<Outcome, GatewayError>;

    /// Cancel a pending order (order-detail flows, not the submit FSM).
    async fn cancel_transaction(
        &self,
        transaction_id: &str,
        kind: TransactionKind,
    ) -> Result<Outcome, GatewayError>;
}

/// Mock gateway for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct MockGateway {
        /// Count of each operation type
        transfer_count: AtomicUsize,
        buy_count: AtomicUsize,
        sell_count: AtomicUsize,
        cancel_count: AtomicUsize,
        /// Track orders for verification
        transfers: Mutex<Vec<TransferOrder>>,
        sells: Mutex<Vec<SellOrder>>,
        /// Configured behavior
        fail_transport: Mutex<bool>,
        reject: Mutex<bool>,
        hold: Mutex<bool>,
        release: Notify,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail_transport(&self, fail: bool) {
            *self.fail_transport.lock().unwrap() = fail;
        }

        pub fn set_reject(&self, reject: bool) {
            *self.reject.lock().unwrap() = reject;
        }

        /// Park every call until [`release`](Self::release).
        pub fn set_hold(&self, hold: bool) {
            *self.hold.lock().unwrap() = hold;
        }

        pub fn release(&self) {
            self.release.notify_waiters();
        }

        pub fn transfer_count(&self) -> usize {
            self.transfer_count.load(Ordering::SeqCst)
        }

        pub fn buy_count(&self) -> usize {
            self.buy_count.load(Ordering::SeqCst)
        }

        pub fn sell_count(&self) -> usize {
            self.sell_count.load(Ordering::SeqCst)
        }

        pub fn cancel_count(&self) -> usize {
            self.cancel_count.load(Ordering::SeqCst)
        }

        pub fn total_calls(&self) -> usize {
            self.transfer_count() + self.buy_count() + self.sell_count()
        }

        pub fn last_transfer(&self) -> Option<TransferOrder> {
            self.transfers.lock().unwrap().last().cloned()
        }

        pub fn last_sell(&self) -> Option<SellOrder> {
            self.sells.lock().unwrap().last().cloned()
        }

        async fn respond(&self, hash: &str) -> Result<Outcome, GatewayError> {
            let held = *self.hold.lock().unwrap();
            if held {
                self.release.notified().await;
            }

            if *self.fail_transport.lock().unwrap() {
                Err(GatewayError::Transport("connection reset".into()))
            } else if *self.reject.lock().unwrap() {
                Ok(Outcome::rejected("Mock rejection"))
            } else {
                Ok(Outcome {
                    success: true,
                    transaction_id: Some("tx-1".into()),
                    transaction_url: Some(format!("https://explorer.test/tx/{}", hash)),
                    transaction_hash: Some(hash.into()),
                    error_message: None,
                })
            }
        }
    }

    #[async_trait]
    impl TransactionGateway for MockGateway {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn send_crypto(&self, order: &TransferOrder) -> Result<Outcome, GatewayError> {
            self.transfer_count.fetch_add(1, Ordering::SeqCst);
            self.transfers.lock().unwrap().push(order.clone());
            self.respond("0xfeed").await
        }

        async fn create_on_ramp(&self, _order: &BuyOrder) -> Result<Outcome, GatewayError> {
            self.buy_count.fetch_add(1, Ordering::SeqCst);
            self.respond("0xb0b").await
        }

        async fn create_off_ramp(&self, order: &SellOrder) -> Result<Outcome, GatewayError> {
            self.sell_count.fetch_add(1, Ordering::SeqCst);
            self.sells.lock().unwrap().push(order.clone());
            self.respond("0x5e11").await
        }

        async fn cancel_transaction(
            &self,
            _transaction_id: &str,
            _kind: TransactionKind,
        ) -> Result<Outcome, GatewayError> {
            self.cancel_count.fetch_add(1, Ordering::SeqCst);
            self.respond("").await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn buy() -> BuyOrder {
            BuyOrder {
                user_id: 1001,
                provider_id: 2,
                token_id: 7,
                fiat_amount: Decimal::new(10, 0),
            }
        }

        #[tokio::test]
        async fn test_mock_gateway_success() {
            let gateway = MockGateway::new();
            let outcome = gateway.create_on_ramp(&buy()).await.unwrap();
            assert!(outcome.success);
            assert_eq!(gateway.buy_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_gateway_failures() {
            let gateway = MockGateway::new();
            gateway.set_reject(true);
            assert!(!gateway.create_on_ramp(&buy()).await.unwrap().success);

            gateway.set_fail_transport(true);
            assert!(gateway.create_on_ramp(&buy()).await.is_err());
        }
    }
}

#[cfg(test)]
pub use mock::MockGateway;
