//! Polygon.io minute aggregates.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use shared::datetime::{format_date, millis_to_datetime};
use shared::models::CandlestickRecord;
use tracing::debug;

/// External source of minute bars.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Minute bars for the calendar dates `from..=to`, at most `limit` rows, ascending.
    async fn minute_bars(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CandlestickRecord>>;
}

#[derive(Debug, Clone)]
pub struct PolygonClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PolygonClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Aggregates endpoint without query parameters, safe to log.
    pub fn aggregates_url(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/v2/aggs/ticker/{}/range/1/minute/{}/{}",
            self.base_url,
            ticker,
            format_date(&from),
            format_date(&to)
        )
    }
}

#[async_trait]
impl MarketDataProvider for PolygonClient {
    async fn minute_bars(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CandlestickRecord>> {
        let url = self.aggregates_url(ticker, from, to);
        debug!("Requesting polygon aggregates url={} limit={}", url, limit);

        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", limit.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("polygon returned status {} for url={}", response.status(), url);
        }

        let body: AggregatesResponse = response.json().await?;
        body.into_records()
    }
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<Vec<AggregateBar>>,
}

impl AggregatesResponse {
    fn into_records(self) -> Result<Vec<CandlestickRecord>> {
        if self.status == "ERROR" || self.status == "NOT_AUTHORIZED" {
            bail!(
                "polygon request failed with status {}: {}",
                self.status,
                self.error.unwrap_or_default()
            );
        }

        Ok(self
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(AggregateBar::into_record)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Window start, epoch milliseconds
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: Option<f64>,
    #[serde(default)]
    vw: Option<f64>,
}

impl AggregateBar {
    fn into_record(self) -> Option<CandlestickRecord> {
        Some(CandlestickRecord {
            datetime: millis_to_datetime(self.t)?,
            open_price: Some(self.o),
            close_price: Some(self.c),
            low_price: Some(self.l),
            high_price: Some(self.h),
            volume: self.v,
            weighted_volume: self.vw,
        })
    }
}
