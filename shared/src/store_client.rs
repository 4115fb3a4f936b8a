use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::datetime::format_date;
use crate::models::{AssetUpload, CandlestickQueryResponse, CandlestickRecord, CandlestickResults};

/// Read/write access to stored candlesticks.
#[async_trait]
pub trait CandlestickStore: Send + Sync {
    /// Stored rows for `ticker` between the start of `from` and the end of `to`.
    async fn fetch_candlesticks(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CandlestickResults>;

    /// Upsert `candlesticks` for `ticker`.
    async fn upload_candlesticks(&self, ticker: &str, candlesticks: &[CandlestickRecord])
        -> Result<()>;
}

/// HTTP client for the store service.
#[derive(Debug, Clone)]
pub struct StoreApiClient {
    pub base_url: String,
    client: reqwest::Client,
}

impl StoreApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn candlesticks_url(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/assets/candlesticks/{}/{}/{}",
            self.base_url,
            ticker,
            format_date(&from),
            format_date(&to)
        )
    }

    pub fn assets_url(&self) -> String {
        format!("{}/assets", self.base_url)
    }
}

#[async_trait]
impl CandlestickStore for StoreApiClient {
    async fn fetch_candlesticks(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CandlestickResults> {
        let url = self.candlesticks_url(ticker, from, to);
        debug!("Requesting stored candlesticks by url={}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("store returned status {} for url={}", response.status(), url);
        }

        let body: CandlestickQueryResponse = response.json().await?;
        Ok(body.results)
    }

    async fn upload_candlesticks(
        &self,
        ticker: &str,
        candlesticks: &[CandlestickRecord],
    ) -> Result<()> {
        let url = self.assets_url();
        debug!(
            "Uploading {} candlesticks for ticker={} by url={}",
            candlesticks.len(),
            ticker,
            url
        );

        let payload = AssetUpload {
            ticker: ticker.to_string(),
            candlesticks: candlesticks.to_vec(),
            ..Default::default()
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            bail!("store returned status {} for url={}", response.status(), url);
        }

        Ok(())
    }
}
