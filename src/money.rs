//! Money String Module
//!
//! Amounts live as decimal strings while the user types them, so a half-typed
//! value such as `"12."` or `"0.0"` survives untouched between keystrokes.
//! All conversions between those strings and `rust_decimal::Decimal` go
//! through this module.
//!
//! ## Accepted format
//! - ASCII digits with at most one `.` separator
//! - A trailing separator (`"12."`) is accepted as an in-progress entry
//! - No sign, no exponent, no grouping commas, no leading separator
//!
//! ## Usage
//! ```rust
//! use ramp_engine::money::{parse_amount, truncate_fraction};
//!
//! let value = parse_amount("12.5").unwrap();
//! assert_eq!(value.to_string(), "12.5");
//!
//! assert_eq!(truncate_fraction("0.003412", 4).unwrap(), "0.0034");
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl MoneyError {
    pub fn code(&self) -> &'static str {
        match self {
            MoneyError::PrecisionOverflow { .. } => "PRECISION_OVERFLOW",
            MoneyError::InvalidAmount => "INVALID_AMOUNT",
            MoneyError::Overflow => "OVERFLOW",
            MoneyError::InvalidFormat(_) => "INVALID_FORMAT",
        }
    }
}

// ============================================================================
// Format checks
// ============================================================================

/// Split a decimal string into whole and fractional parts after checking the format.
fn split_checked(amount_str: &str) -> Result<(&str, Option<&str>), MoneyError> {
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    let (whole, frac) = match amount_str.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (amount_str, None),
    };

    if whole.is_empty() {
        return Err(MoneyError::InvalidFormat(
            "missing leading zero (e.g., use 0.5 instead of .5)".into(),
        ));
    }

    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in whole part: {}",
            whole
        )));
    }

    if let Some(frac) = frac
        && !frac.bytes().all(|b| b.is_ascii_digit())
    {
        // Also catches a second separator, which lands in the fraction
        return Err(MoneyError::InvalidFormat(format!(
            "invalid fractional part: {}",
            frac
        )));
    }

    Ok((whole, frac))
}

/// Number of digits after the separator (`"12."` has zero).
pub fn fraction_len(amount_str: &str) -> usize {
    amount_str
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0)
}

// ============================================================================
// Parse: String → Decimal
// ============================================================================

/// Parse a decimal string (zero allowed) into a `Decimal`.
///
/// # Errors
/// * `InvalidFormat` - not digits with at most one separator
/// * `InvalidAmount` - signed input
/// * `Overflow` - more digits than `Decimal` can hold
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    let (whole, frac) = split_checked(amount_str)?;

    let normalized = match frac {
        Some(frac) if !frac.is_empty() => format!("{}.{}", whole, frac),
        _ => whole.to_string(),
    };

    Decimal::from_str(&normalized).map_err(|_| MoneyError::Overflow)
}

/// Parse a positive amount with at most `decimals` fractional digits.
///
/// Used when an intent is built: the value must be strictly positive and
/// must not exceed the side's precision.
pub fn parse_positive(amount_str: &str, decimals: u32) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    let provided = fraction_len(amount_str) as u32;
    if provided > decimals {
        return Err(MoneyError::PrecisionOverflow {
            provided,
            max: decimals,
        });
    }

    let value = parse_amount(amount_str)?;
    if value <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount);
    }
    Ok(value)
}

/// True when the string parses to a value strictly greater than zero.
pub fn is_positive(amount_str: &str) -> bool {
    parse_amount(amount_str)
        .map(|v| v > Decimal::ZERO)
        .unwrap_or(false)
}

// ============================================================================
// Normalize: provider / free-text → buffer string
// ============================================================================

/// Validate `amount_str` and cut its fraction down to `decimals` digits.
///
/// Truncates instead of rounding: a derived amount is never shown larger
/// than what the provider quoted. A dangling separator is dropped.
pub fn truncate_fraction(amount_str: &str, decimals: u32) -> Result<String, MoneyError> {
    let amount_str = amount_str.trim();
    let (whole, frac) = split_checked(amount_str)?;

    let frac = frac.unwrap_or("");
    let keep = frac.len().min(decimals as usize);
    if keep == 0 {
        Ok(whole.to_string())
    } else {
        Ok(format!("{}.{}", whole, &frac[..keep]))
    }
}

/// Turn arbitrary typed or pasted text into a valid buffer string.
///
/// Keeps digits and the first separator, drops everything else, strips
/// redundant leading zeros and truncates the fraction to `decimals`.
/// Returns `Ok(None)` when nothing usable remains so the caller can fall
/// back to its canonical empty value. An integer part longer than
/// `max_integer_digits` is rejected with [`MoneyError::Overflow`]: cutting
/// integer digits would change the amount's magnitude.
pub fn normalize_input(
    input: &str,
    decimals: u32,
    max_integer_digits: usize,
) -> Result<Option<String>, MoneyError> {
    let mut whole = String::new();
    let mut frac = String::new();
    let mut seen_dot = false;

    for c in input.chars() {
        match c {
            '0'..='9' if seen_dot => {
                if frac.len() < decimals as usize {
                    frac.push(c);
                }
            }
            '0'..='9' => {
                if whole == "0" {
                    whole.clear();
                }
                whole.push(c);
            }
            '.' if !seen_dot => seen_dot = true,
            _ => {}
        }
    }

    if whole.len() > max_integer_digits {
        return Err(MoneyError::Overflow);
    }
    if whole.is_empty() && !seen_dot {
        return Ok(None);
    }
    if whole.is_empty() {
        whole.push('0');
    }

    if seen_dot && decimals > 0 {
        Ok(Some(format!("{}.{}", whole, frac)))
    } else {
        Ok(Some(whole))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
