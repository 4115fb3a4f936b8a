//! Store service: REST access to stored candlesticks.

pub mod error;
pub mod repositories;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use shared::request_span::trace_layer;

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/version", get(routes::version))
        .route("/assets", post(routes::post_assets))
        .route("/assets/:field/:ticker/:from/:to", get(routes::get_asset_data))
        .layer(trace_layer())
        .with_state(state)
}
