use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pricecheck_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::PricingError;
use crate::http::{build_client, check_status, parse_base_url};
use crate::retry::retry_with_backoff;
use crate::source::ReferenceSource;
use crate::types::{select_reference_price, ReferencePrice, ReferenceRow};

/// Client for the reference price service that fronts the ERP price list.
///
/// `GET {base}/precio/{sku}?serie={key}&tarifa={tariff}` answers a JSON array
/// of rows; see [`ReferenceClient::fetch_reference`] for how a price is picked.
pub struct ReferenceClient {
    client: Client,
    base_url: Url,
    tariff: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ReferenceClient {
    /// # Errors
    ///
    /// - [`PricingError::InvalidBaseUrl`] if `base_url` is not an `http(s)` URL.
    /// - [`PricingError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        tariff: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, PricingError> {
        // Exactly one trailing slash so `join` appends instead of replacing.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(&normalised)?,
            tariff: tariff.to_owned(),
            max_retries,
            backoff_base_ms: backoff_base_secs.saturating_mul(1_000),
        })
    }

    /// # Errors
    ///
    /// See [`ReferenceClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PricingError> {
        Self::new(
            &config.reference_base_url,
            &config.reference_tariff,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Fetches the expected price of `sku` for the series `serie_key`.
    ///
    /// The price is taken from the first row that has a column named after
    /// the series; when no row has one, the `precio` column of the first row
    /// is used.
    ///
    /// # Errors
    ///
    /// - [`PricingError::RateLimited`], [`PricingError::NotFound`] or
    ///   [`PricingError::UnexpectedStatus`] for non-2xx responses.
    /// - [`PricingError::Http`] on network failure.
    /// - [`PricingError::Deserialize`] if the body is not a JSON array of objects.
    /// - [`PricingError::MissingPrice`] if no row yields a price.
    pub async fn fetch_reference(
        &self,
        sku: &str,
        serie_key: &str,
    ) -> Result<ReferencePrice, PricingError> {
        let url = self.price_url(sku, serie_key)?;
        let url = url.as_str();

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url).send().await?;
            let response = check_status(response, url)?;
            Ok(response.text().await?)
        })
        .await?;

        let rows: Vec<ReferenceRow> =
            serde_json::from_str(&body).map_err(|e| PricingError::Deserialize {
                context: format!("reference rows for {sku}"),
                source: e,
            })?;

        let price = select_reference_price(&rows, serie_key).ok_or_else(|| {
            PricingError::MissingPrice {
                context: format!("reference for {sku} serie {serie_key} ({} rows)", rows.len()),
            }
        })?;

        tracing::debug!(sku, serie_key, price = %price, "reference price received");

        Ok(ReferencePrice {
            sku: sku.to_owned(),
            serie_key: serie_key.to_owned(),
            price,
        })
    }

    fn price_url(&self, sku: &str, serie_key: &str) -> Result<Url, PricingError> {
        let encoded = utf8_percent_encode(sku, NON_ALPHANUMERIC).to_string();
        let mut url = self
            .base_url
            .join(&format!("precio/{encoded}"))
            .map_err(|e| PricingError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("serie", serie_key)
            .append_pair("tarifa", &self.tariff);
        Ok(url)
    }
}

#[async_trait]
impl ReferenceSource for ReferenceClient {
    async fn fetch_reference(
        &self,
        sku: &str,
        serie_key: &str,
    ) -> Result<ReferencePrice, PricingError> {
        ReferenceClient::fetch_reference(self, sku, serie_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ReferenceClient {
        ReferenceClient::new(base, "1", 5, "pricecheck-test", 0, 0).unwrap()
    }

    #[test]
    fn price_url_encodes_sku_and_adds_query() {
        let url = client("http://localhost:13000").price_url("AB 12/3", "4").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:13000/precio/AB%2012%2F3?serie=4&tarifa=1"
        );
    }

    #[test]
    fn price_url_keeps_base_path() {
        let url = client("http://prices.test/api/").price_url("ABC123", "Z").unwrap();
        assert_eq!(url.as_str(), "http://prices.test/api/precio/ABC123?serie=Z&tarifa=1");
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(matches!(
            ReferenceClient::new("not a url", "1", 5, "ua", 0, 0),
            Err(PricingError::InvalidBaseUrl { .. })
        ));
    }
}
