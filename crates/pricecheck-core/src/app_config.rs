use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub quote_base_url: String,
    pub quote_endpoint: String,
    pub reference_base_url: String,
    pub reference_tariff: String,
    pub catalog_path: PathBuf,
    pub catalog_max_hits: usize,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// Full URL of the quote service endpoint, joined without doubled slashes.
    #[must_use]
    pub fn quote_url(&self) -> String {
        format!(
            "{}/{}",
            self.quote_base_url.trim_end_matches('/'),
            self.quote_endpoint.trim_start_matches('/')
        )
    }
}
