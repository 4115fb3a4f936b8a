//! The "read stored, fill gaps, backfill, render" workflow behind the chart.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use shared::models::CandlestickRecord;
use shared::store_client::CandlestickStore;
use tracing::{debug, error, info, warn};

use crate::services::gap_fill::{detect_gaps, interior_holes, Gap, InteriorHole, RequestedRange};
use crate::services::pagination::plan_windows;
use crate::services::polygon::MarketDataProvider;

pub type CandlestickSeries = BTreeMap<NaiveDateTime, CandlestickRecord>;

/// Result of one chart generation.
#[derive(Debug, Clone, Default)]
pub struct ChartOutcome {
    /// Stored and fetched bars keyed by timestamp, ascending.
    pub series: CandlestickSeries,
    pub gaps: Vec<Gap>,
    /// Bars fetched from the provider for the gaps.
    pub fetched: usize,
    /// Holes inside the stored range. Reported, never fetched.
    pub interior_holes: Vec<InteriorHole>,
}

pub struct ChartService {
    store: Arc<dyn CandlestickStore>,
    provider: Arc<dyn MarketDataProvider>,
    batch_limit: u32,
    hole_threshold: TimeDelta,
}

impl ChartService {
    pub fn new(
        store: Arc<dyn CandlestickStore>,
        provider: Arc<dyn MarketDataProvider>,
        batch_limit: u32,
        hole_threshold: TimeDelta,
    ) -> Self {
        Self {
            store,
            provider,
            batch_limit,
            hole_threshold,
        }
    }

    /// Build the series for `ticker` over the days `from..=to`.
    ///
    /// Failures of the store or the provider are logged and leave the
    /// affected part of the series empty.
    pub async fn generate(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> ChartOutcome {
        let Some(range) = RequestedRange::from_dates(from, to) else {
            warn!("Incorrect user input: from={} > to={}", from, to);
            return ChartOutcome::default();
        };
        info!(
            "Creating a candlestick for ticker={}, from={}, to={}",
            ticker, range.from, range.to
        );

        let stored = match self
            .store
            .fetch_candlesticks(ticker, range.from_date(), range.to_date())
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Cannot get data from backend: {:#}", e);
                return ChartOutcome::default();
            }
        };

        let bounds = stored.bounds();
        let mut series: CandlestickSeries = stored
            .data
            .into_iter()
            .map(|candlestick| (candlestick.datetime, candlestick))
            .collect();

        let holes = interior_holes(series.keys(), self.hole_threshold);
        for hole in &holes {
            warn!(
                "Stored data for ticker={} has a {} minute hole between {} and {}; it is not refetched",
                ticker,
                hole.minutes(),
                hole.after,
                hole.before
            );
        }

        let gaps = detect_gaps(range, bounds);
        if bounds.is_none() {
            debug!(
                "No stored data for ticker={}, from {} to {}. Start downloading",
                ticker, range.from, range.to
            );
        }

        let mut missing = CandlestickSeries::new();
        for gap in &gaps {
            debug!("Detect missing data between {} and {}", gap.start, gap.end);
            let rows = self.download(ticker, gap).await;
            debug!("Downloaded {} missing data", rows.len());
            missing.extend(rows.into_iter().map(|c| (c.datetime, c)));
        }

        let fetched = missing.len();
        if !missing.is_empty() {
            let upload: Vec<CandlestickRecord> = missing.values().cloned().collect();
            if let Err(e) = self.store.upload_candlesticks(ticker, &upload).await {
                error!("Cannot upload missing data: {:#}", e);
            }
            series.extend(missing);
        }

        ChartOutcome {
            series,
            gaps,
            fetched,
            interior_holes: holes,
        }
    }

    /// Fetch one gap window by window, keeping only bars inside the gap.
    async fn download(&self, ticker: &str, gap: &Gap) -> Vec<CandlestickRecord> {
        let mut rows = Vec::new();

        for window in plan_windows(gap.start, gap.end, self.batch_limit) {
            match self
                .provider
                .minute_bars(ticker, window.from_date(), window.to_date(), window.limit)
                .await
            {
                Ok(bars) if bars.is_empty() => {
                    debug!(
                        "Provider returned no data for ticker={} from {} to {}",
                        ticker,
                        window.from_date(),
                        window.to_date()
                    );
                }
                Ok(bars) => rows.extend(bars.into_iter().filter(|c| gap.contains(c.datetime))),
                Err(e) => {
                    warn!(
                        "Cannot download data for ticker={} from {} to {}: {:#}",
                        ticker,
                        window.from_date(),
                        window.to_date(),
                        e
                    );
                }
            }
        }

        rows
    }
}
