//! Pieces shared by the quote and reference clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::PricingError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, PricingError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `raw` as an absolute `http(s)` URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, PricingError> {
    let url = Url::parse(raw).map_err(|e| PricingError::InvalidBaseUrl {
        base_url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PricingError::InvalidBaseUrl {
            base_url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Maps non-2xx responses to typed errors and passes successful ones through.
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response, PricingError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(PricingError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(PricingError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(PricingError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(parse_base_url("http://localhost:13000").is_ok());
        assert!(parse_base_url("https://quoter.example.test/en/").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(matches!(
            parse_base_url("ftp://prices.test"),
            Err(PricingError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("localhost"),
            Err(PricingError::InvalidBaseUrl { .. })
        ));
    }
}
