pub mod assets;
pub mod candlesticks;
