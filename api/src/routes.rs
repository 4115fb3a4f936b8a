use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use shared::datetime::{end_of_day_offset, parse_date_or_datetime};
use shared::models::{
    AssetUpload, AssetUploadResponse, CandlestickQueryResponse, CandlestickRecord,
    CandlestickResults,
};
use shared::BuildInfo;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn version() -> Json<BuildInfo> {
    Json(BuildInfo::new("api"))
}

/// `GET /assets/{field}/{ticker}/{from}/{to}`
///
/// `to` covers its whole day. Anything that yields no rows (unknown asset,
/// reversed range, unsupported field) still answers 200 with empty results.
pub async fn get_asset_data(
    State(state): State<AppState>,
    Path((field, ticker, from, to)): Path<(String, String, String, String)>,
) -> Result<Json<CandlestickQueryResponse>, ApiError> {
    let from = parse_date_or_datetime(&from)
        .map_err(|e| ApiError::BadRequest(format!("invalid from date {from:?}: {e}")))?;
    let to = parse_date_or_datetime(&to)
        .map_err(|e| ApiError::BadRequest(format!("invalid to date {to:?}: {e}")))?
        + end_of_day_offset();

    let mut response = CandlestickQueryResponse {
        ticker: ticker.clone(),
        status: "OK".to_string(),
        results: CandlestickResults::default(),
    };

    let Some(asset) = state.candlesticks.find_asset_by_ticker(&ticker).await? else {
        warn!("Cannot find an asset for ticker {}", ticker);
        return Ok(Json(response));
    };

    if from > to {
        debug!("Empty range requested: from={} > to={}", from, to);
        return Ok(Json(response));
    }

    if field != "candlesticks" {
        warn!("Cannot prepare data for \"{}\". Unknown field", field);
        return Ok(Json(response));
    }

    debug!(
        "Request to db for candlesticks for asset={} ({}), from={}, to={}",
        asset.id, asset.ticker, from, to
    );
    let rows = state.candlesticks.find_in_range(asset.id, from, to).await?;
    if rows.is_empty() {
        debug!("No candlestick data");
    }

    let data: Vec<CandlestickRecord> = rows.into_iter().map(CandlestickRecord::from).collect();
    response.results = CandlestickResults::from_sorted(data);
    Ok(Json(response))
}

/// `POST /assets`: create the asset if needed and upsert its candlesticks.
pub async fn post_assets(
    State(state): State<AppState>,
    Json(upload): Json<AssetUpload>,
) -> Result<(StatusCode, Json<AssetUploadResponse>), ApiError> {
    if upload.ticker.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Cannot extract asset info from the given data. No \"ticker\" key".to_string(),
        ));
    }

    debug!(
        "Handle {} candlesticks for ticker={}",
        upload.candlesticks.len(),
        upload.ticker
    );
    let written = state.candlesticks.store_upload(&upload).await?;
    info!("Stored {} candlesticks for ticker={}", written, upload.ticker);

    Ok((
        StatusCode::CREATED,
        Json(AssetUploadResponse {
            ticker: upload.ticker,
            status: "Created".to_string(),
            result_count: written,
        }),
    ))
}
