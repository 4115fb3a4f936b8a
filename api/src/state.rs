use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::repositories::candlestick_repository::CandlestickRepository;

#[derive(Clone)]
pub struct AppState {
    pub candlesticks: Arc<CandlestickRepository>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            candlesticks: Arc::new(CandlestickRepository::new(Arc::new(db))),
        }
    }
}
