//! Pricing provider seam
//!
//! The synchronizer only sees this trait; concrete providers (REST client,
//! simulated rate) are injected at construction.

use async_trait::async_trait;

use super::types::{QuoteError, QuoteRequest, QuoteResult};

/// External pricing collaborator.
#[async_trait]
pub trait PricingProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Convert `request.source_amount` from one asset into the other.
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, QuoteError>;
}


#[cfg(test)]
pub use mock::ScriptedPricing;
