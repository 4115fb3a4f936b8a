//! Gap-fill behaviour of the chart workflow against in-memory collaborators.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use dashboard::services::gap_fill::GapKind;
use dashboard::services::{ChartService, MarketDataProvider};
use dashboard::{router, AppState};
use shared::datetime::{end_of_day, start_of_day};
use shared::models::{CandlestickRecord, CandlestickResults};
use shared::store_client::CandlestickStore;
use tower::ServiceExt;

#[derive(Default)]
struct FakeStore {
    rows: Mutex<BTreeMap<NaiveDateTime, CandlestickRecord>>,
    uploads: Mutex<Vec<Vec<CandlestickRecord>>>,
    reads: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
}

impl FakeStore {
    fn with_rows(rows: Vec<CandlestickRecord>) -> Self {
        let store = FakeStore::default();
        store
            .rows
            .lock()
            .unwrap()
            .extend(rows.into_iter().map(|r| (r.datetime, r)));
        store
    }

    fn uploads(&self) -> Vec<Vec<CandlestickRecord>> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandlestickStore for FakeStore {
    async fn fetch_candlesticks(
        &self,
        _ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CandlestickResults> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            bail!("store returned status 500");
        }
        let rows = self.rows.lock().unwrap();
        let data = rows
            .range(start_of_day(from)..=end_of_day(to))
            .map(|(_, r)| r.clone())
            .collect();
        Ok(CandlestickResults::from_sorted(data))
    }

    async fn upload_candlesticks(
        &self,
        _ticker: &str,
        candlesticks: &[CandlestickRecord],
    ) -> Result<()> {
        self.uploads.lock().unwrap().push(candlesticks.to_vec());
        if self.fail_writes {
            bail!("store returned status 500");
        }
        let mut rows = self.rows.lock().unwrap();
        rows.extend(candlesticks.iter().map(|r| (r.datetime, r.clone())));
        Ok(())
    }
}

/// Serves canned bars by calendar date, truncated to the requested limit.
#[derive(Default)]
struct FakeProvider {
    bars: Vec<CandlestickRecord>,
    calls: Mutex<Vec<(NaiveDate, NaiveDate, u32)>>,
}

impl FakeProvider {
    fn with_bars(bars: Vec<CandlestickRecord>) -> Self {
        FakeProvider {
            bars,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(NaiveDate, NaiveDate, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn minute_bars(
        &self,
        _ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CandlestickRecord>> {
        self.calls.lock().unwrap().push((from, to, limit));
        Ok(self
            .bars
            .iter()
            .filter(|b| b.datetime.date() >= from && b.datetime.date() <= to)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
}

fn bar(datetime: NaiveDateTime, close: f64) -> CandlestickRecord {
    CandlestickRecord {
        datetime,
        open_price: Some(close - 0.5),
        close_price: Some(close),
        low_price: Some(close - 1.0),
        high_price: Some(close + 1.0),
        volume: Some(1000.0),
        weighted_volume: Some(close),
    }
}

/// Five bars from 14:30 on each day in `days`, closes starting at `base`.
fn session_bars(days: impl IntoIterator<Item = u32>, base: f64) -> Vec<CandlestickRecord> {
    let mut bars = Vec::new();
    for d in days {
        for minute in 0..5 {
            let ts = day(d).and_hms_opt(14, 30 + minute, 0).unwrap();
            bars.push(bar(ts, base + f64::from(d) + f64::from(minute) / 10.0));
        }
    }
    bars
}

fn service(store: &Arc<FakeStore>, provider: &Arc<FakeProvider>, batch_limit: u32) -> ChartService {
    ChartService::new(
        store.clone(),
        provider.clone(),
        batch_limit,
        TimeDelta::days(1),
    )
}

fn closes(series: &BTreeMap<NaiveDateTime, CandlestickRecord>) -> Vec<Option<f64>> {
    series.values().map(|r| r.close_price).collect()
}

#[tokio::test]
async fn test_empty_store_fetches_full_range() {
    let provider_bars = session_bars(4..=8, 100.0);
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::with_bars(provider_bars.clone()));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert_eq!(outcome.gaps.len(), 1);
    assert_eq!(outcome.gaps[0].kind, GapKind::Full);
    assert_eq!(provider.calls(), vec![(day(4), day(8), 50_000)]);

    let expected: Vec<_> = provider_bars.iter().map(|b| b.close_price).collect();
    assert_eq!(closes(&outcome.series), expected);
    assert_eq!(outcome.fetched, provider_bars.len());

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0], provider_bars);
}

#[tokio::test]
async fn test_only_trailing_slice_is_fetched() {
    let mut stored = vec![bar(start_of_day(day(4)), 1.0)];
    stored.extend(session_bars(4..=5, 100.0));
    let stored_max = stored.last().unwrap().datetime;

    let store = Arc::new(FakeStore::with_rows(stored.clone()));
    // Provider disagrees on the stored days; those rows must not leak in
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 500.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert_eq!(outcome.gaps.len(), 1);
    assert_eq!(outcome.gaps[0].kind, GapKind::Trailing);
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(provider.calls()[0].0, day(5));
    assert_eq!(provider.calls()[0].1, day(8));

    for row in &stored {
        assert_eq!(outcome.series.get(&row.datetime), Some(row));
    }

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].len(), 15);
    assert!(uploads[0].iter().all(|r| r.datetime > stored_max));
    assert_eq!(outcome.series.len(), stored.len() + 15);
}

/// One bar per minute on `d` from `start_hour` up to, not including, `end_hour`.
fn minute_bars(d: u32, start_hour: u32, end_hour: u32, close: f64) -> Vec<CandlestickRecord> {
    let start = day(d).and_hms_opt(start_hour, 0, 0).unwrap();
    let minutes = i64::from(end_hour - start_hour) * 60;
    (0..minutes)
        .map(|m| bar(start + TimeDelta::minutes(m), close))
        .collect()
}

#[tokio::test]
async fn test_late_trailing_slice_on_the_same_day_is_fetched() {
    // Provider serves the whole date ascending from its first bar, truncated at the limit
    let store = Arc::new(FakeStore::with_rows(minute_bars(4, 4, 19, 100.0)));
    let provider = Arc::new(FakeProvider::with_bars(minute_bars(4, 4, 20, 500.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(4))
        .await;

    assert!(provider.calls().iter().all(|(_, _, limit)| *limit == 50_000));
    assert_eq!(outcome.fetched, 60);
    assert_eq!(outcome.series.len(), 16 * 60);

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].len(), 60);
    assert_eq!(uploads[0][0].datetime, day(4).and_hms_opt(19, 0, 0).unwrap());
    assert!(uploads[0].iter().all(|r| r.close_price == Some(500.0)));
}

#[tokio::test]
async fn test_covered_range_skips_provider_despite_interior_hole() {
    let mut stored = vec![bar(start_of_day(day(4)), 1.0)];
    // Nothing on the 6th
    stored.extend(session_bars([4, 5, 7, 8], 100.0));
    stored.push(bar(day(8).and_hms_opt(23, 59, 0).unwrap(), 2.0));

    let store = Arc::new(FakeStore::with_rows(stored.clone()));
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 500.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert!(outcome.gaps.is_empty());
    assert!(provider.calls().is_empty());
    assert!(store.uploads().is_empty());
    assert_eq!(outcome.series.len(), stored.len());
    assert_eq!(outcome.interior_holes.len(), 1);
    assert_eq!(outcome.interior_holes[0].after.date(), day(5));
    assert_eq!(outcome.interior_holes[0].before.date(), day(7));
}

#[tokio::test]
async fn test_pagination_issues_one_call_per_window() {
    let provider_bars = session_bars(1..=10, 100.0);
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::with_bars(provider_bars.clone()));
    let batch_limit = 2 * 1440;

    let outcome = service(&store, &provider, batch_limit)
        .generate("AAPL", day(1), day(10))
        .await;

    let calls = provider.calls();
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().all(|(_, _, limit)| *limit <= batch_limit));
    assert_eq!(calls[0].0, day(1));
    assert_eq!(calls[4].1, day(10));
    for pair in calls.windows(2) {
        assert!(pair[0].0 < pair[1].0);
    }

    let expected: Vec<_> = provider_bars.iter().map(|b| b.close_price).collect();
    assert_eq!(closes(&outcome.series), expected);
    // Boundary days are served twice but uploaded once
    assert_eq!(store.uploads()[0].len(), provider_bars.len());
}

#[tokio::test]
async fn test_reversed_range_makes_no_calls() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 100.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(8), day(4))
        .await;

    assert!(outcome.series.is_empty());
    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    assert!(provider.calls().is_empty());
    assert!(store.uploads().is_empty());
}

#[tokio::test]
async fn test_empty_provider_result_uploads_nothing() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::default());

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert!(outcome.series.is_empty());
    assert_eq!(provider.calls().len(), 1);
    assert!(store.uploads().is_empty());
}

#[tokio::test]
async fn test_store_read_failure_renders_empty_chart() {
    let store = Arc::new(FakeStore {
        fail_reads: true,
        ..Default::default()
    });
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 100.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert!(outcome.series.is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_store_write_failure_still_plots_fetched_data() {
    let store = Arc::new(FakeStore {
        fail_writes: true,
        ..Default::default()
    });
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 100.0)));

    let outcome = service(&store, &provider, 50_000)
        .generate("AAPL", day(4), day(8))
        .await;

    assert_eq!(outcome.series.len(), 25);
    assert_eq!(store.uploads().len(), 1);
}

#[tokio::test]
async fn test_second_render_is_served_from_store() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=8, 100.0)));
    let charts = service(&store, &provider, 50_000);

    let first = charts.generate("AAPL", day(4), day(8)).await;
    let calls_after_first = provider.calls().len();
    let second = charts.generate("AAPL", day(5), day(7)).await;

    assert_eq!(calls_after_first, 1);
    // Days 5..7 are inside the stored range apart from their edges
    assert!(second
        .gaps
        .iter()
        .all(|g| g.kind == GapKind::Leading || g.kind == GapKind::Trailing));
    assert_eq!(second.series.len(), 15);
    assert!(first.series.len() > second.series.len());
}

async fn get_body(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_routes_render_page_and_series() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider::with_bars(session_bars(4..=5, 100.0)));
    let state = AppState::new(
        service(&store, &provider, 50_000),
        vec!["AAPL".to_string(), "MSFT".to_string()],
    );
    let app = router(state);

    let (status, page) = get_body(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Select a ticker..."));
    assert!(page.contains("<option value=\"MSFT\">"));
    assert!(provider.calls().is_empty());

    let (status, body) =
        get_body(app.clone(), "/api/chart?ticker=AAPL&from=2021-01-04&to=2021-01-05").await;
    assert_eq!(status, StatusCode::OK);
    let series: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(series["x"].as_array().unwrap().len(), 10);
    assert_eq!(series["x"][0], "2021-01-04 14:30:00");

    let (status, page) =
        get_body(app.clone(), "/?ticker=AAPL&from=2021-01-04&to=2021-01-05").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<option value=\"AAPL\" selected>"));
    assert!(page.contains("candlestick"));

    let (status, body) = get_body(app, "/api/chart?ticker=NOPE").await;
    assert_eq!(status, StatusCode::OK);
    let series: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(series["x"].as_array().unwrap().is_empty());
}
