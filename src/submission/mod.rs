//! Transaction submission
//!
//! # State Machine
//!
//! ```text
//! IDLE → VALIDATING → IN_FLIGHT → SUCCEEDED
//!             ↓            ↓
//!           FAILED ←───────┘
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Single flight**: only one submission per engine is ever in flight
//! 2. **Validate first**: nothing reaches the gateway without a valid intent
//! 3. **Acknowledge to re-arm**: terminal states hold until acknowledged

pub mod cancel;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod state;
pub mod submitter;

pub use cancel::OrderCanceller;
pub use error::{GatewayError, SubmissionError, ValidationError};
pub use gateway::{BuyOrder, SellOrder, TransactionGateway, TransferOrder};
pub use intent::{Selection, TransactionIntent};
pub use state::{Outcome, SubmissionReceipt, SubmissionState};
pub use submitter::TransactionSubmitter;
