use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One minute OHLCV bar as exchanged between the services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlestickRecord {
    #[serde(with = "crate::datetime::wire_format")]
    pub datetime: NaiveDateTime,
    pub open_price: Option<f64>,
    pub close_price: Option<f64>,
    pub low_price: Option<f64>,
    pub high_price: Option<f64>,
    pub volume: Option<f64>,
    pub weighted_volume: Option<f64>,
}

/// Body of `GET /assets/candlesticks/{ticker}/{from}/{to}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandlestickQueryResponse {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: CandlestickResults,
}

/// Stored rows for a query; serializes to `{}` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandlestickResults {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<CandlestickRecord>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::datetime::wire_format::option"
    )]
    pub min_datetime: Option<NaiveDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::datetime::wire_format::option"
    )]
    pub max_datetime: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
}

impl CandlestickResults {
    /// Build results from rows already ordered by `datetime`.
    pub fn from_sorted(data: Vec<CandlestickRecord>) -> Self {
        if data.is_empty() {
            return Self::default();
        }

        let min_datetime = data.first().map(|c| c.datetime);
        let max_datetime = data.last().map(|c| c.datetime);
        let result_count = Some(data.len());

        Self {
            data,
            min_datetime,
            max_datetime,
            result_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stored coverage as `(min, max)`, present only when rows exist.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.data.is_empty() {
            return None;
        }
        match (self.min_datetime, self.max_datetime) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => {
                let min = self.data.iter().map(|c| c.datetime).min()?;
                let max = self.data.iter().map(|c| c.datetime).max()?;
                Some((min, max))
            }
        }
    }
}

/// Body of `POST /assets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetUpload {
    #[serde(default)]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub candlesticks: Vec<CandlestickRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetUploadResponse {
    pub ticker: String,
    pub status: String,
    pub result_count: usize,
}
