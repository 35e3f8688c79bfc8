//! Seams between the reconciler and the two price sources.

use async_trait::async_trait;

use crate::error::PricingError;
use crate::types::{PriceQuote, ReferencePrice};

/// Produces the quoted price of a configured variant.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, sku: &str, variant_code: &str)
        -> Result<PriceQuote, PricingError>;
}

/// Produces the expected price of a SKU for a series.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_reference(
        &self,
        sku: &str,
        serie_key: &str,
    ) -> Result<ReferencePrice, PricingError>;
}
