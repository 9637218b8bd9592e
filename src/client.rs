//! CoinGecko HTTP client: request pacing plus bounded 429 recovery.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::{ApiError, Result};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const ERROR_BODY_MAX: usize = 200;

pub struct GeckoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    request_interval: Duration,
    rate_limit_delay: Duration,
    rate_limit_retries: u32,
    last_request: Mutex<Option<Instant>>,
}

impl GeckoClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            request_interval: Duration::from_millis(settings.request_interval_ms),
            rate_limit_delay: Duration::from_secs(settings.rate_limit_delay_secs),
            rate_limit_retries: settings.rate_limit_retries,
            last_request: Mutex::new(None),
        })
    }

    /// Replaces the base URL (testing against a mock upstream).
    #[allow(dead_code)]
    pub(crate) fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Issues one GET and decodes the JSON body. A 429 is retried in
    /// place after a fixed delay, up to the configured ceiling; any
    /// other non-success status is fatal to the caller.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut rate_limited: u32 = 0;
        loop {
            self.pace().await;
            let resp = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .header("Accept", "application/json")
                .query(query)
                .send()
                .await?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if rate_limited >= self.rate_limit_retries {
                    return Err(ApiError::RateLimited {
                        path: path.to_string(),
                        attempts: rate_limited,
                    });
                }
                rate_limited += 1;
                log::warn!(
                    "client.rate_limited path={path} retry={rate_limited}/{}",
                    self.rate_limit_retries
                );
                tokio::time::sleep(self.rate_limit_delay).await;
                continue;
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiError::Status {
                    status,
                    path: path.to_string(),
                    body: body.chars().take(ERROR_BODY_MAX).collect(),
                });
            }
            return Ok(resp.json::<T>().await?);
        }
    }

    /// Keeps at least `request_interval` between request sends. The
    /// slot is claimed under the lock; the sleep happens outside it.
    async fn pace(&self) {
        let wait = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let ready_at = match *last {
                Some(prev) => (prev + self.request_interval).max(now),
                None => now,
            };
            *last = Some(ready_at);
            ready_at - now
        };
        if wait > Duration::ZERO {
            tokio::time::sleep(wait).await;
        }
    }
}
