pub mod chart_service;
pub mod gap_fill;
pub mod pagination;
pub mod polygon;

pub use chart_service::{ChartOutcome, ChartService};
pub use polygon::{MarketDataProvider, PolygonClient};
