//! Hyperliquid info endpoint client

use super::{dedupe_and_sort, time_windows, FundingRecord};
use crate::config::FundingConfig;
use reqwest::Client;
use std::time::Duration;

/// Client for funding-rate history
pub struct FundingClient {
    config: FundingConfig,
    client: Client,
}

impl FundingClient {
    pub fn with_config(config: FundingConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetch funding records for one window
    pub async fn fetch_window(
        &self,
        coin: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> anyhow::Result<Vec<FundingRecord>> {
        let body = serde_json::json!({
            "type": "fundingHistory",
            "coin": coin,
            "startTime": start_ms,
            "endTime": end_ms,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Funding API error {}: {}", status, text);
        }

        let records: Vec<FundingRecord> = response.json().await?;
        Ok(records)
    }

    /// Fetch the configured lookback ending at `now_ms`.
    ///
    /// A window that fails is logged and counted as empty.
    pub async fn fetch_history(&self, coin: &str, now_ms: i64) -> Vec<FundingRecord> {
        let lookback_ms = (self.config.lookback_hours as i64).saturating_mul(3_600_000);
        let window_ms = (self.config.window_days as i64).saturating_mul(86_400_000);
        let windows = time_windows(now_ms.saturating_sub(lookback_ms), now_ms, window_ms);
        let delay = Duration::from_millis(self.config.request_delay_ms);

        tracing::info!(coin, requests = windows.len(), "Fetching funding history");

        let mut all = Vec::new();
        for (i, &(start, end)) in windows.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(coin, window = i + 1, start, end, "Fetching window");
            match self.fetch_window(coin, start, end).await {
                Ok(records) => all.extend(records),
                Err(e) => tracing::warn!(coin, window = i + 1, error = %e, "Funding window failed"),
            }
        }

        dedupe_and_sort(all)
    }
}
