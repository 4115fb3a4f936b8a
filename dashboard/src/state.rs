use std::sync::Arc;

use crate::services::ChartService;

#[derive(Clone)]
pub struct AppState {
    pub charts: Arc<ChartService>,
    /// Tickers offered in the dropdown; anything else is refused.
    pub tickers: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(charts: ChartService, tickers: Vec<String>) -> Self {
        Self {
            charts: Arc::new(charts),
            tickers: Arc::new(tickers),
        }
    }
}
