//! Ramp Engine - amount entry, quoting and submission for on/off-ramp clients
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, TokenId, etc.)
//! - [`money`] - Decimal-string parsing and normalization
//! - [`amount`] - Amount buffer and keypad entry controller
//! - [`quote`] - Debounced, latest-wins quote synchronizer
//! - [`address`] - Per-chain destination address validation
//! - [`submission`] - Transaction submission FSM
//! - [`presenter`] - Submission result display mapping
//! - [`session`] - One engine instance per entry screen
//! - [`simulated`] - In-memory collaborators (feature `simulated`)

// Core types - must be first!
pub mod core_types;

pub mod address;
pub mod amount;
pub mod money;
pub mod presenter;
pub mod quote;
pub mod session;
pub mod submission;

#[cfg(feature = "simulated")]
pub mod simulated;

// Configuration & logging
pub mod config;
pub mod logging;

mod util;

// Convenient re-exports at crate root
pub use address::{AddressFormat, AddressValidator, ChainFamily};
pub use amount::{AmountBuffer, AmountPair, DigitEntryController, EditingMode, KeypadKey, Precision};
pub use core_types::{SeqNum, Token, TransactionKind, UserId};
pub use presenter::{DisplayState, Presentation, present};
pub use quote::{PricingProvider, QuoteError, QuoteSynchronizer};
pub use session::{AmountSession, SessionSettings};
pub use submission::{
    Selection, SubmissionError, SubmissionState, TransactionGateway, TransactionSubmitter,
};
