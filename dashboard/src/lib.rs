//! Candlestick dashboard: reads the store, fills gaps from Polygon and plots.

pub mod chart;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

use axum::routing::get;
use axum::Router;
use shared::request_span::trace_layer;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::dashboard))
        .route("/api/chart", get(routes::chart_data))
        .route("/health", get(routes::health_check))
        .route("/version", get(routes::version))
        .layer(trace_layer())
        .with_state(state)
}
