//! End-to-end flows through the public API with the simulated collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use ramp_engine::address::ChainFamily;
use ramp_engine::amount::AmountBuffer;
use ramp_engine::presenter::Presentation;
use ramp_engine::quote::{
    PricingProvider, QuoteApplied, QuoteError, QuoteRequest, QuoteResult, QuoteRoute,
    QuoteSettings, QuoteSynchronizer,
};
use ramp_engine::simulated::{FixedRatePricing, SimulatedGateway};
use ramp_engine::submission::SubmissionState;
use ramp_engine::{
    AmountSession, DigitEntryController, DisplayState, EditingMode, Selection, SessionSettings,
    Token, TransactionKind,
};

const FIAT: u32 = 840;
const ETH: u32 = 7;
const EVM_ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn eth() -> Token {
    Token::new(ETH, "ETH", ChainFamily::EVM)
}

fn open(pricing: Arc<dyn PricingProvider>, gateway: Arc<SimulatedGateway>) -> AmountSession {
    AmountSession::new(
        pricing,
        gateway,
        Selection::new(1001, 1, eth()),
        FIAT,
        SessionSettings::default(),
    )
}

/// 12.5 fiat at 3600 per token ≈ 0.0034
fn priced() -> Arc<FixedRatePricing> {
    Arc::new(FixedRatePricing::new().with_price(FIAT, ETH, Decimal::new(3600, 0)))
}

/// Answers `amount * 0.001` after a per-amount delay.
struct DelayedPricing {
    delays: FxHashMap<String, Duration>,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl PricingProvider for DelayedPricing {
    fn name(&self) -> &'static str {
        "delayed"
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteError> {
        self.seen.lock().unwrap().push(request.source_amount.clone());
        let delay = self
            .delays
            .get(&request.source_amount)
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        let amount: Decimal = request.source_amount.parse().unwrap();
        Ok(QuoteResult::new(
            (amount * Decimal::new(1, 3)).normalize().to_string(),
        ))
    }
}

#[tokio::test(start_paused = true)]
async fn scenario_fiat_typing_is_quoted_once_after_debounce() {
    let session = open(priced(), Arc::new(SimulatedGateway::default()));

    let mut seen = Vec::new();
    for c in ['1', '2', '.', '5'] {
        session.press(ramp_engine::KeypadKey::from_char(c).unwrap());
        seen.push(session.amounts().fiat);
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    assert_eq!(seen, ["1", "12", "12.", "12.5"]);
    assert_eq!(session.amounts().crypto, "0.00");

    assert_eq!(session.wait_for_quote().await, Some(QuoteApplied::Applied));
    let amounts = session.amounts();
    assert_eq!(amounts.fiat, "12.5");
    assert_eq!(amounts.crypto, "0.0034");
    assert!(!session.is_quote_in_flight());
    assert!(session.quote_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn scenario_crypto_integer_cap_rejects_fifth_digit() {
    let session = open(priced(), Arc::new(SimulatedGateway::default()));
    assert!(session.switch_mode(EditingMode::Crypto));
    assert_eq!(session.amounts().crypto, "0.00");

    let mut seen = Vec::new();
    for _ in 0..5 {
        let changed = session.press_digit(9);
        seen.push((changed, session.amounts().crypto));
    }
    assert_eq!(
        seen,
        [
            (true, "9".to_string()),
            (true, "99".to_string()),
            (true, "999".to_string()),
            (true, "9999".to_string()),
            (false, "9999".to_string()),
        ]
    );

    // crypto → fiat at 3600
    assert_eq!(session.wait_for_quote().await, Some(QuoteApplied::Applied));
    assert_eq!(session.amounts().fiat, "35996400");
}

#[tokio::test(start_paused = true)]
async fn scenario_out_of_order_responses_keep_latest() {
    let pricing = Arc::new(DelayedPricing {
        delays: [
            ("10".to_string(), Duration::from_millis(300)),
            ("20".to_string(), Duration::from_millis(50)),
        ]
        .into_iter()
        .collect(),
        seen: Mutex::new(Vec::new()),
    });
    let controller = DigitEntryController::default();
    let buffer = Arc::new(Mutex::new(AmountBuffer::new()));
    let sync = QuoteSynchronizer::new(
        pricing.clone(),
        buffer.clone(),
        QuoteRoute {
            provider_id: 1,
            fiat_asset_id: FIAT,
            token_id: ETH,
        },
        QuoteSettings::default(),
    );

    controller.set_text(&mut buffer.lock().unwrap(), "10");
    let first = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.sync_now().await })
    };
    tokio::task::yield_now().await;

    controller.set_text(&mut buffer.lock().unwrap(), "20");
    let second = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.sync_now().await })
    };

    assert_eq!(second.await.unwrap(), QuoteApplied::Applied);
    assert_eq!(first.await.unwrap(), QuoteApplied::Discarded);
    assert_eq!(*pricing.seen.lock().unwrap(), ["10", "20"]);
    assert_eq!(sync.latest_seq(), 2);
    assert_eq!(buffer.lock().unwrap().get(EditingMode::Crypto), "0.02");
}

#[tokio::test(start_paused = true)]
async fn scenario_invalid_evm_address_fails_without_network() {
    let gateway = Arc::new(SimulatedGateway::default());
    let session = open(priced(), gateway.clone());
    session.set_text("12.5");
    session.wait_for_quote().await;
    session.set_destination("0xZZZ");

    let display = session.continue_with(TransactionKind::Transfer).await;
    assert_eq!(
        display,
        DisplayState::Failure {
            reason: "Enter a valid evm address".into(),
            presentation: Presentation::Inline,
        }
    );
    assert!(matches!(
        session.submission_state(),
        SubmissionState::Failed(_)
    ));
    assert!(gateway.transactions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scenario_sell_without_bank_account() {
    let gateway = Arc::new(SimulatedGateway::default());
    let session = open(priced(), gateway.clone());
    session.set_text("100");

    let display = session.continue_with(TransactionKind::Sell).await;
    let DisplayState::Failure { reason, .. } = display else {
        panic!("expected failure, got {:?}", display);
    };
    assert_eq!(reason.to_lowercase(), "bank account required");
    assert!(gateway.transactions().is_empty());

    // fixing the selection and acknowledging re-arms the submitter
    assert!(session.acknowledge());
    session.set_bank_account(42);
    assert!(matches!(
        session.continue_with(TransactionKind::Sell).await,
        DisplayState::Success(_)
    ));
    assert_eq!(gateway.transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_transfer_success_then_acknowledge() {
    let gateway = Arc::new(SimulatedGateway::default());
    let session = open(priced(), gateway.clone());
    session.switch_mode(EditingMode::Crypto);
    for key in [0, 0] {
        session.press_digit(key);
    }
    session.press_decimal_point();
    session.press_digit(2);
    session.press_digit(5);
    assert_eq!(session.amounts().crypto, "0.25");
    session.set_destination(EVM_ADDR);

    let display = session.continue_with(TransactionKind::Transfer).await;
    let DisplayState::Success(details) = display else {
        panic!("expected success, got {:?}", display);
    };
    assert_eq!(details.kind, TransactionKind::Transfer);
    assert_eq!(details.amount, "0.25");
    assert_eq!(details.token_symbol, "ETH");
    let hash = details.transaction_hash.clone().unwrap();
    assert!(!hash.is_empty());
    assert_eq!(gateway.transactions()[0].transaction_hash, hash);

    assert!(session.acknowledge());
    assert_eq!(session.submission_state(), SubmissionState::Idle);
    assert_eq!(session.display_state(), DisplayState::None);
}

#[tokio::test(start_paused = true)]
async fn unsupported_pair_resets_derived_and_flags_error() {
    let pricing = Arc::new(FixedRatePricing::new());
    let session = open(pricing, Arc::new(SimulatedGateway::default()));
    session.set_text("50");

    assert!(matches!(
        session.wait_for_quote().await,
        Some(QuoteApplied::Failed(QuoteError::Rejected(_)))
    ));
    assert_eq!(session.amounts().crypto, "0.00");
    assert!(session.quote_error().is_some());
}

#[tokio::test(start_paused = true)]
async fn cancel_accepted_order() {
    let gateway = Arc::new(SimulatedGateway::default());
    let session = open(priced(), gateway.clone());
    session.set_text("20");
    session.continue_with(TransactionKind::Buy).await;
    session.acknowledge();

    let id = gateway.transactions()[0].transaction_id.clone();
    assert!(session.cancel_order(&id, TransactionKind::Buy).await.is_ok());
    assert!(session.cancel_order(&id, TransactionKind::Buy).await.is_err());
    assert!(gateway.transactions()[0].cancelled);
}
