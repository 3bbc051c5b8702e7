//! Quote synchronization
//!
//! Debounced, latest-wins conversion of the authoritative amount into the
//! derived one through an injected [`PricingProvider`].

pub mod provider;
pub mod synchronizer;
pub mod types;

pub use provider::PricingProvider;
pub use synchronizer::{QuoteApplied, QuoteSettings, QuoteSynchronizer, SharedBuffer};
pub use types::{QuoteError, QuoteRequest, QuoteResult, QuoteRoute};
