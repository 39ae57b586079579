use anyhow::{ensure, Context, Result};

use crate::parser::DEFAULT_MAX_INPUT_BYTES;

/// Service configuration loaded from environment variables.
/// Every value has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Overall confidence below which a parse is flagged for manual review.
    pub review_threshold: f64,
    pub max_input_bytes: usize,
    pub max_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            review_threshold: 0.5,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_batch_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            review_threshold: parse_env("REVIEW_THRESHOLD", defaults.review_threshold)?,
            max_input_bytes: parse_env("MAX_INPUT_BYTES", defaults.max_input_bytes)?,
            max_batch_size: parse_env("MAX_BATCH_SIZE", defaults.max_batch_size)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.review_threshold),
            "REVIEW_THRESHOLD must be between 0 and 1, got {}",
            self.review_threshold
        );
        ensure!(self.max_input_bytes > 0, "MAX_INPUT_BYTES must be positive");
        ensure!(self.max_batch_size > 0, "MAX_BATCH_SIZE must be positive");
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
