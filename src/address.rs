//! Destination address validation
//!
//! A registry maps each [`ChainFamily`] to an [`AddressFormat`] strategy.
//! Call sites only ever ask `is_valid(address, family)`; supporting a new
//! chain means registering one more format, not touching the callers.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Chain family identifier (e.g. `"evm"`, `"solana"`).
///
/// Kept open-ended so families registered at runtime need no enum change.
/// Names are case-insensitive: deserialized values are lowercased like
/// [`ChainFamily::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChainFamily(Cow<'static, str>);

impl ChainFamily {
    pub const EVM: ChainFamily = ChainFamily(Cow::Borrowed("evm"));
    pub const STARKNET: ChainFamily = ChainFamily(Cow::Borrowed("starknet"));
    pub const SOLANA: ChainFamily = ChainFamily(Cow::Borrowed("solana"));
    pub const BITCOIN: ChainFamily = ChainFamily(Cow::Borrowed("bitcoin"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChainFamily {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<ChainFamily> for String {
    fn from(family: ChainFamily) -> Self {
        family.0.into_owned()
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address format strategy for one chain family.
pub trait AddressFormat: Send + Sync {
    /// Format name for logging
    fn name(&self) -> &'static str;

    /// Check an already-trimmed, non-empty address.
    fn is_valid(&self, address: &str) -> bool;
}

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn is_base58(s: &str) -> bool {
    s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

fn hex_body(address: &str) -> Option<&str> {
    address
        .strip_prefix("0x")
        .filter(|body| body.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `0x` followed by exactly 40 hex characters (checksum casing not enforced).
#[derive(Debug, Default)]
pub struct EvmAddress;

impl AddressFormat for EvmAddress {
    fn name(&self) -> &'static str {
        "evm"
    }

    fn is_valid(&self, address: &str) -> bool {
        hex_body(address).is_some_and(|body| body.len() == 40)
    }
}

/// `0x` followed by 1 to 64 hex characters (felt, leading zeros optional).
#[derive(Debug, Default)]
pub struct StarknetAddress;

impl AddressFormat for StarknetAddress {
    fn name(&self) -> &'static str {
        "starknet"
    }

    fn is_valid(&self, address: &str) -> bool {
        hex_body(address).is_some_and(|body| (1..=64).contains(&body.len()))
    }
}

/// Base58 public key, 32 to 44 characters.
#[derive(Debug, Default)]
pub struct SolanaAddress;

impl AddressFormat for SolanaAddress {
    fn name(&self) -> &'static str {
        "solana"
    }

    fn is_valid(&self, address: &str) -> bool {
        (32..=44).contains(&address.len()) && is_base58(address)
    }
}

/// Legacy/P2SH Base58 (`1...`, `3...`) or bech32 (`bc1...`) mainnet address.
#[derive(Debug, Default)]
pub struct BitcoinAddress;

impl AddressFormat for BitcoinAddress {
    fn name(&self) -> &'static str {
        "bitcoin"
    }

    fn is_valid(&self, address: &str) -> bool {
        if let Some(data) = address.strip_prefix("bc1") {
            return (14..=74).contains(&address.len())
                && data
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        }
        (address.starts_with('1') || address.starts_with('3'))
            && (26..=35).contains(&address.len())
            && is_base58(address)
    }
}

/// Registry of address formats keyed by chain family.
#[derive(Clone)]
pub struct AddressValidator {
    formats: FxHashMap<ChainFamily, Arc<dyn AddressFormat>>,
}

impl AddressValidator {
    /// Empty registry: every address is rejected until formats are registered.
    pub fn empty() -> Self {
        Self {
            formats: FxHashMap::default(),
        }
    }

    /// Registry preloaded with EVM, StarkNet, Solana and Bitcoin formats.
    pub fn with_defaults() -> Self {
        let mut validator = Self::empty();
        validator.register(ChainFamily::EVM, EvmAddress);
        validator.register(ChainFamily::STARKNET, StarknetAddress);
        validator.register(ChainFamily::SOLANA, SolanaAddress);
        validator.register(ChainFamily::BITCOIN, BitcoinAddress);
        validator
    }

    /// Register (or replace) the format used for `family`.
    pub fn register(&mut self, family: ChainFamily, format: impl AddressFormat + 'static) {
        self.formats.insert(family, Arc::new(format));
    }

    pub fn supports(&self, family: &ChainFamily) -> bool {
        self.formats.contains_key(family)
    }

    /// Validate `address` for `family`.
    ///
    /// Empty or whitespace-only input and unknown families are always invalid.
    pub fn is_valid(&self, address: &str, family: &ChainFamily) -> bool {
        let address = address.trim();
        if address.is_empty() {
            return false;
        }
        match self.formats.get(family) {
            Some(format) => format.is_valid(address),
            None => {
                tracing::debug!(chain = %family, "No address format registered");
                false
            }
        }
    }
}

impl Default for AddressValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for AddressValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.formats.values().map(|format| format.name()).collect();
        names.sort_unstable();
        f.debug_struct("AddressValidator")
            .field("formats", &names)
            .finish()
    }
}
