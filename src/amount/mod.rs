//! Amount entry
//!
//! [`AmountBuffer`] stores the fiat/crypto pair and the editing mode;
//! [`DigitEntryController`] applies keypad and text edits to it under the
//! per-side [`Precision`] rules.

pub mod buffer;
pub mod entry;

pub use buffer::{AmountBuffer, AmountPair, CRYPTO_EMPTY, EditingMode, FIAT_EMPTY};
pub use entry::{DigitEntryController, KeypadKey, Precision, SideRules};
