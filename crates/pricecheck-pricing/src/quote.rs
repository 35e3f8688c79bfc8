use async_trait::async_trait;
use pricecheck_core::AppConfig;
use reqwest::multipart::Form;
use reqwest::{Client, Url};

use crate::error::PricingError;
use crate::http::{build_client, check_status, parse_base_url};
use crate::retry::retry_with_backoff;
use crate::source::QuoteSource;
use crate::types::{PriceQuote, QuoteResponse};

/// Client for the configurator's price service.
///
/// Each quote is a `POST` of a multipart form with the `sku` and the
/// `variant_code` fields; the service answers `{ "price": .., "currency": .. }`.
pub struct QuoteClient {
    client: Client,
    url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl QuoteClient {
    /// Creates a client posting to the absolute `quote_url`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidBaseUrl`] if `quote_url` is not an `http(s)` URL.
    /// - [`PricingError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        quote_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            url: parse_base_url(quote_url)?,
            max_retries,
            backoff_base_ms: backoff_base_secs.saturating_mul(1_000),
        })
    }

    /// # Errors
    ///
    /// See [`QuoteClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PricingError> {
        Self::new(
            &config.quote_url(),
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Asks the price service for the price of `sku` configured as `variant_code`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::RateLimited`], [`PricingError::NotFound`] or
    ///   [`PricingError::UnexpectedStatus`] for non-2xx responses.
    /// - [`PricingError::Http`] on network failure.
    /// - [`PricingError::Deserialize`] if the body is not the expected JSON.
    /// - [`PricingError::MissingPrice`] if the body carries no usable price.
    pub async fn fetch_quote(
        &self,
        sku: &str,
        variant_code: &str,
    ) -> Result<PriceQuote, PricingError> {
        let url = self.url.as_str();

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let form = Form::new()
                .text("sku", sku.to_owned())
                .text("variant_code", variant_code.to_owned());
            let response = self.client.post(url).multipart(form).send().await?;
            let response = check_status(response, url)?;
            Ok(response.text().await?)
        })
        .await?;

        let parsed: QuoteResponse =
            serde_json::from_str(&body).map_err(|e| PricingError::Deserialize {
                context: format!("quote for {sku}"),
                source: e,
            })?;

        let price = parsed.price.ok_or_else(|| PricingError::MissingPrice {
            context: format!("quote for {sku} ({variant_code})"),
        })?;

        tracing::debug!(sku, variant_code, price = %price, "quote received");

        Ok(PriceQuote {
            sku: sku.to_owned(),
            variant_code: variant_code.to_owned(),
            price,
            currency: parsed.currency,
        })
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch_quote(
        &self,
        sku: &str,
        variant_code: &str,
    ) -> Result<PriceQuote, PricingError> {
        QuoteClient::fetch_quote(self, sku, variant_code).await
    }
}
