use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::datetime::{format_date, parse_date};
use shared::BuildInfo;
use tracing::warn;

use crate::chart::ChartSeries;
use crate::error::DashboardError;
use crate::state::AppState;

/// Earliest date offered by the date pickers.
pub const MIN_DATE_ALLOWED: &str = "1995-08-05";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub ticker: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub ticker: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Turn query parameters into a chart request.
///
/// `Ok(None)` means nothing was asked for (no ticker selected). Missing dates
/// default to yesterday..today. `Err` carries a message for the user.
pub fn resolve_request(
    query: &ChartQuery,
    tickers: &[String],
    today: NaiveDate,
) -> Result<Option<ChartRequest>, String> {
    let ticker = match query.ticker.as_deref().map(str::trim) {
        Some(ticker) if !ticker.is_empty() => ticker,
        _ => return Ok(None),
    };

    if !tickers.iter().any(|t| t == ticker) {
        return Err(format!("Unknown ticker {ticker}"));
    }

    let from = parse_query_date(query.from.as_deref(), today - TimeDelta::days(1))?;
    let to = parse_query_date(query.to.as_deref(), today)?;

    Ok(Some(ChartRequest {
        ticker: ticker.to_string(),
        from,
        to,
    }))
}

fn parse_query_date(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => parse_date(raw).map_err(|_| format!("Invalid date {raw}, expected YYYY-MM-DD")),
    }
}

async fn build_chart(state: &AppState, query: &ChartQuery) -> (ChartSeries, String) {
    let today = Utc::now().date_naive();

    match resolve_request(query, &state.tickers, today) {
        Ok(Some(request)) => {
            let outcome = state
                .charts
                .generate(&request.ticker, request.from, request.to)
                .await;
            let series = ChartSeries::from(&outcome.series);
            let notice = if series.is_empty() {
                format!("No data for {} in the selected range", request.ticker)
            } else {
                String::new()
            };
            (series, notice)
        }
        Ok(None) => (ChartSeries::default(), String::new()),
        Err(message) => {
            warn!("Incorrect user input: {}", message);
            (ChartSeries::default(), message)
        }
    }
}

pub struct TickerOption {
    pub name: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub tickers: Vec<TickerOption>,
    pub from: String,
    pub to: String,
    pub min_date: &'static str,
    pub max_date: String,
    pub figure_json: String,
    pub notice: String,
}

/// `GET /`: the dashboard page, plotting when a ticker was submitted.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Html<String>, DashboardError> {
    let today = Utc::now().date_naive();
    let (series, notice) = build_chart(&state, &query).await;

    let selected = query.ticker.as_deref().unwrap_or_default();
    let tickers = state
        .tickers
        .iter()
        .map(|name| TickerOption {
            name: name.clone(),
            selected: name == selected,
        })
        .collect();

    let page = DashboardTemplate {
        tickers,
        from: query
            .from
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format_date(&(today - TimeDelta::days(1)))),
        to: query
            .to
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format_date(&today)),
        min_date: MIN_DATE_ALLOWED,
        max_date: format_date(&today),
        // Keep the JSON from closing the surrounding <script> element
        figure_json: series.to_figure().to_string().replace("</", "<\\/"),
        notice,
    };

    Ok(Html(page.render()?))
}

/// `GET /api/chart`: the same series as JSON.
pub async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Json<ChartSeries> {
    let (series, _) = build_chart(&state, &query).await;
    Json(series)
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn version() -> Json<BuildInfo> {
    Json(BuildInfo::new("dashboard"))
}
