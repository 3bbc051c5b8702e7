//! Fiat/crypto amount pair with an authoritative side
//!
//! The side matching [`EditingMode`] is the one the user types into; the
//! other side only ever receives quoted values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::DecimalString;

/// Canonical empty value of the fiat side.
pub const FIAT_EMPTY: &str = "0";

/// Canonical empty value of the crypto side.
pub const CRYPTO_EMPTY: &str = "0.00";

/// Which side of the pair the user is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditingMode {
    Fiat,
    Crypto,
}

impl EditingMode {
    /// The opposite side (the derived one while `self` is authoritative).
    #[inline]
    pub fn other(&self) -> Self {
        match self {
            EditingMode::Fiat => EditingMode::Crypto,
            EditingMode::Crypto => EditingMode::Fiat,
        }
    }

    /// Reset value shown for this side.
    #[inline]
    pub fn canonical_empty(&self) -> &'static str {
        match self {
            EditingMode::Fiat => FIAT_EMPTY,
            EditingMode::Crypto => CRYPTO_EMPTY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditingMode::Fiat => "FIAT",
            EditingMode::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for EditingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of both amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPair {
    pub fiat: DecimalString,
    pub crypto: DecimalString,
}

impl AmountPair {
    pub fn get(&self, side: EditingMode) -> &str {
        match side {
            EditingMode::Fiat => &self.fiat,
            EditingMode::Crypto => &self.crypto,
        }
    }
}

impl Default for AmountPair {
    fn default() -> Self {
        Self {
            fiat: FIAT_EMPTY.to_string(),
            crypto: CRYPTO_EMPTY.to_string(),
        }
    }
}

/// Amount buffer owned by one entry session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountBuffer {
    pair: AmountPair,
    mode: EditingMode,
}

impl AmountBuffer {
    /// Both sides canonical, fiat authoritative.
    pub fn new() -> Self {
        Self {
            pair: AmountPair::default(),
            mode: EditingMode::Fiat,
        }
    }

    /// Buffer seeded with an already-normalized fiat amount (default or draft).
    ///
    /// Normalization is the entry controller's job; see
    /// [`DigitEntryController::seed`](super::entry::DigitEntryController::seed).
    pub(crate) fn with_fiat(fiat: DecimalString) -> Self {
        Self {
            pair: AmountPair {
                fiat,
                crypto: CRYPTO_EMPTY.to_string(),
            },
            mode: EditingMode::Fiat,
        }
    }

    #[inline]
    pub fn mode(&self) -> EditingMode {
        self.mode
    }

    /// Change the authoritative side. Never touches either value.
    ///
    /// Returns `true` if the mode actually changed.
    pub fn switch_mode(&mut self, mode: EditingMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn toggle_mode(&mut self) -> EditingMode {
        self.mode = self.mode.other();
        self.mode
    }

    pub fn amounts(&self) -> &AmountPair {
        &self.pair
    }

    pub fn get(&self, side: EditingMode) -> &str {
        self.pair.get(side)
    }

    /// Value of the side being typed.
    pub fn authoritative(&self) -> &str {
        self.pair.get(self.mode)
    }

    /// Value of the quoted side.
    pub fn derived(&self) -> &str {
        self.pair.get(self.mode.other())
    }

    /// Overwrite one side. Returns `true` if the stored value changed.
    pub(crate) fn set(&mut self, side: EditingMode, value: DecimalString) -> bool {
        let slot = match side {
            EditingMode::Fiat => &mut self.pair.fiat,
            EditingMode::Crypto => &mut self.pair.crypto,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Reset one side to its canonical empty value.
    pub(crate) fn reset(&mut self, side: EditingMode) -> bool {
        self.set(side, side.canonical_empty().to_string())
    }

    /// Reset both sides regardless of mode.
    pub(crate) fn clear(&mut self) -> bool {
        let fiat = self.reset(EditingMode::Fiat);
        let crypto = self.reset(EditingMode::Crypto);
        fiat || crypto
    }

    pub fn is_canonical(&self, side: EditingMode) -> bool {
        self.get(side) == side.canonical_empty()
    }
}

impl Default for AmountBuffer {
    fn default() -> Self {
        Self::new()
    }
}
