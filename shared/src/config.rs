use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://candlesticks.db?mode=rwc";
pub const DEFAULT_BACKEND_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_POLYGON_BASE_URL: &str = "https://api.polygon.io";
pub const DEFAULT_POLYGON_BATCH_LIMIT: u32 = 50_000;
/// Four days: long enough to span a weekend plus a market holiday.
pub const DEFAULT_GAP_WARN_THRESHOLD_MINUTES: i64 = 4 * 24 * 60;
pub const MAX_GAP_WARN_THRESHOLD_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub backend_api_url: String,
    pub polygon_api_key: Option<String>,
    pub polygon_base_url: String,
    pub polygon_batch_limit: u32,
    pub tickers: Vec<String>,
    pub gap_warn_threshold_minutes: i64,
    pub log_json: bool,
    /// Directory for per-process log files; stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load a dotenv file (when given) and then read the process environment.
    ///
    /// A missing explicit config file is an error; without one, a `.env` in the
    /// working directory is picked up if present.
    pub fn load(dotenv_path: Option<&Path>) -> Result<Self, anyhow::Error> {
        match dotenv_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Cannot open config {}", path.display());
                }
                dotenv::from_path(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
            }
            None => {
                dotenv::dotenv().ok();
            }
        }

        Self::from_env()
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let polygon_batch_limit = match std::env::var("POLYGON_BATCH_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("POLYGON_BATCH_LIMIT is not a number: {raw}"))?,
            Err(_) => DEFAULT_POLYGON_BATCH_LIMIT,
        };

        let gap_warn_threshold_minutes = match std::env::var("GAP_WARN_THRESHOLD_MINUTES") {
            Ok(raw) => parse_gap_threshold(&raw)?,
            Err(_) => DEFAULT_GAP_WARN_THRESHOLD_MINUTES,
        };

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            backend_api_url: std::env::var("BACKEND_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BACKEND_API_URL.to_string()),
            polygon_api_key: std::env::var("POLYGON_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            polygon_base_url: std::env::var("POLYGON_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_POLYGON_BASE_URL.to_string()),
            polygon_batch_limit,
            tickers: parse_tickers(&std::env::var("TICKERS").unwrap_or_default()),
            gap_warn_threshold_minutes,
            log_json: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// The dashboard cannot reach Polygon without a key.
    pub fn require_polygon_api_key(&self) -> Result<&str, anyhow::Error> {
        self.polygon_api_key
            .as_deref()
            .context("POLYGON_API_KEY must be set for the dashboard")
    }
}

/// Minutes between stored bars before a hole is reported, `0..=` one year.
pub fn parse_gap_threshold(raw: &str) -> Result<i64, anyhow::Error> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("GAP_WARN_THRESHOLD_MINUTES is not a number: {raw}"))?;

    if !(0..=MAX_GAP_WARN_THRESHOLD_MINUTES).contains(&minutes) {
        bail!(
            "GAP_WARN_THRESHOLD_MINUTES must be between 0 and {}, got {}",
            MAX_GAP_WARN_THRESHOLD_MINUTES,
            minutes
        );
    }

    Ok(minutes)
}

/// Split a comma separated ticker list, dropping blanks and stray commas.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ticker| !ticker.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tickers() {
        assert_eq!(parse_tickers("AAPL,MSFT, TSLA,"), vec!["AAPL", "MSFT", "TSLA"]);
        assert_eq!(parse_tickers(",AAPL"), vec!["AAPL"]);
        assert!(parse_tickers("").is_empty());
    }

    #[test]
    fn test_parse_gap_threshold() {
        assert_eq!(parse_gap_threshold(" 5760 ").unwrap(), 5760);
        assert_eq!(parse_gap_threshold("0").unwrap(), 0);
        assert_eq!(
            parse_gap_threshold("525600").unwrap(),
            MAX_GAP_WARN_THRESHOLD_MINUTES
        );
        assert!(parse_gap_threshold("-1").is_err());
        assert!(parse_gap_threshold("525601").is_err());
        assert!(parse_gap_threshold(&i64::MAX.to_string()).is_err());
        assert!(parse_gap_threshold("four days").is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here/.env")));
        assert!(result.is_err());
    }
}
