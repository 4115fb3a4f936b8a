pub mod build_info;
pub mod config;
pub mod database;
pub mod datetime;
pub mod entity;
pub mod logging;
pub mod models;
pub mod request_span;
pub mod store_client;

pub use build_info::BuildInfo;
pub use config::Config;
pub use database::get_db_connection;
pub use models::*;
pub use store_client::{CandlestickStore, StoreApiClient};
