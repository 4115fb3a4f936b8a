pub mod candlestick_repository;
