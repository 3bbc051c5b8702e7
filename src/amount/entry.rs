//! Keypad and text entry on the authoritative side
//!
//! Every edit is a pure transition over the side's current string plus the
//! side's [`SideRules`]. Rejected keys leave the buffer untouched and report
//! "no change"; nothing here raises errors or talks to the network.

use serde::{Deserialize, Serialize};

use super::buffer::{AmountBuffer, EditingMode};
use crate::money;

/// Per-side digit limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub fiat_fraction_digits: u32,
    pub crypto_fraction_digits: u32,
    pub fiat_integer_digits: usize,
    pub crypto_integer_digits: usize,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            fiat_fraction_digits: 2,
            crypto_fraction_digits: 4,
            fiat_integer_digits: 12,
            crypto_integer_digits: 4,
        }
    }
}

impl Precision {
    pub fn fraction_digits(&self, side: EditingMode) -> u32 {
        match side {
            EditingMode::Fiat => self.fiat_fraction_digits,
            EditingMode::Crypto => self.crypto_fraction_digits,
        }
    }

    pub fn rules(&self, side: EditingMode) -> SideRules {
        match side {
            EditingMode::Fiat => SideRules {
                fraction_digits: self.fiat_fraction_digits,
                integer_digits: self.fiat_integer_digits,
                canonical_empty: side.canonical_empty(),
            },
            EditingMode::Crypto => SideRules {
                fraction_digits: self.crypto_fraction_digits,
                integer_digits: self.crypto_integer_digits,
                canonical_empty: side.canonical_empty(),
            },
        }
    }
}

/// Limits applied to one side while it is being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideRules {
    pub fraction_digits: u32,
    pub integer_digits: usize,
    pub canonical_empty: &'static str,
}

impl SideRules {
    /// Canonical empty value or a bare `"0"`: the next digit replaces it.
    fn is_blank(&self, value: &str) -> bool {
        value == self.canonical_empty || value == "0"
    }
}

/// One keypad key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeypadKey {
    Digit(u8),
    DecimalPoint,
    Delete,
    Clear,
}

impl KeypadKey {
    /// Map a keypad label (`'0'..='9'`, `'.'`, `'<'` for delete, `'C'`) to a key.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(KeypadKey::Digit(c as u8 - b'0')),
            '.' | ',' => Some(KeypadKey::DecimalPoint),
            '<' => Some(KeypadKey::Delete),
            'C' | 'c' => Some(KeypadKey::Clear),
            _ => None,
        }
    }
}

// ============================================================================
// Pure transitions
// ============================================================================

fn changed(current: &str, next: String) -> Option<String> {
    (next != current).then_some(next)
}

/// Result of appending `digit`, or `None` if the key is rejected / a no-op.
pub fn apply_digit(current: &str, digit: u8, rules: &SideRules) -> Option<String> {
    if digit > 9 {
        return None;
    }
    let c = char::from(b'0' + digit);

    if rules.is_blank(current) {
        return changed(current, c.to_string());
    }

    match current.split_once('.') {
        Some((_, frac)) if frac.len() >= rules.fraction_digits as usize => None,
        Some(_) => Some(format!("{}{}", current, c)),
        None if current.len() >= rules.integer_digits => None,
        None => Some(format!("{}{}", current, c)),
    }
}

/// Result of pressing the separator, or `None` if rejected.
pub fn apply_decimal_point(current: &str, rules: &SideRules) -> Option<String> {
    if rules.fraction_digits == 0 {
        return None;
    }
    if rules.is_blank(current) {
        return Some("0.".to_string());
    }
    if current.contains('.') {
        return None;
    }
    Some(format!("{}.", current))
}

/// Result of deleting the last character, or `None` on a canonical buffer.
pub fn apply_delete(current: &str, rules: &SideRules) -> Option<String> {
    if current == rules.canonical_empty {
        return None;
    }

    let mut next = current.to_string();
    next.pop();
    if next.is_empty() || next == "0" {
        next = rules.canonical_empty.to_string();
    }
    changed(current, next)
}

// ============================================================================
// Controller
// ============================================================================

/// Applies keypad and text edits to whichever side is authoritative.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitEntryController {
    precision: Precision,
}

impl DigitEntryController {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    /// Fresh buffer, fiat side seeded from a default or drafted amount.
    ///
    /// The seed goes through the same normalization as typed text; an
    /// unusable or oversized seed falls back to the canonical empty value.
    pub fn seed(&self, fiat_default: Option<&str>) -> AmountBuffer {
        let rules = self.precision.rules(EditingMode::Fiat);
        match fiat_default.and_then(|raw| {
            money::normalize_input(raw, rules.fraction_digits, rules.integer_digits)
                .ok()
                .flatten()
        }) {
            Some(fiat) => AmountBuffer::with_fiat(fiat),
            None => AmountBuffer::new(),
        }
    }

    /// Write `next` into the authoritative side if the transition accepted the key.
    fn commit(buffer: &mut AmountBuffer, next: Option<String>) -> bool {
        match next {
            Some(value) => buffer.set(buffer.mode(), value),
            None => false,
        }
    }

    pub fn press_digit(&self, buffer: &mut AmountBuffer, digit: u8) -> bool {
        let rules = self.precision.rules(buffer.mode());
        let next = apply_digit(buffer.authoritative(), digit, &rules);
        Self::commit(buffer, next)
    }

    pub fn press_decimal_point(&self, buffer: &mut AmountBuffer) -> bool {
        let rules = self.precision.rules(buffer.mode());
        let next = apply_decimal_point(buffer.authoritative(), &rules);
        Self::commit(buffer, next)
    }

    pub fn press_delete(&self, buffer: &mut AmountBuffer) -> bool {
        let rules = self.precision.rules(buffer.mode());
        let next = apply_delete(buffer.authoritative(), &rules);
        Self::commit(buffer, next)
    }

    /// Reset both sides to canonical empty values.
    pub fn clear(&self, buffer: &mut AmountBuffer) -> bool {
        buffer.clear()
    }

    pub fn press(&self, buffer: &mut AmountBuffer, key: KeypadKey) -> bool {
        match key {
            KeypadKey::Digit(d) => self.press_digit(buffer, d),
            KeypadKey::DecimalPoint => self.press_decimal_point(buffer),
            KeypadKey::Delete => self.press_delete(buffer),
            KeypadKey::Clear => self.clear(buffer),
        }
    }

    /// Replace the authoritative side with free text (typed or pasted).
    ///
    /// Text whose integer part exceeds the side's cap is rejected and the
    /// buffer is left as it was.
    pub fn set_text(&self, buffer: &mut AmountBuffer, text: &str) -> bool {
        let side = buffer.mode();
        let rules = self.precision.rules(side);
        let next = match money::normalize_input(text, rules.fraction_digits, rules.integer_digits)
        {
            Ok(Some(value)) => value,
            Ok(None) => rules.canonical_empty.to_string(),
            Err(_) => return false,
        };
        buffer.set(side, next)
    }
}
