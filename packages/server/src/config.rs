use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::chat_queue::DEFAULT_STALE_AFTER_SECS;
use crate::domains::presence::DEFAULT_PRESENCE_WINDOW_SECS;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub queue_stale_after_secs: i64,
    pub presence_window_secs: i64,
    pub housekeeping_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 8080).context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "admissions".to_string()),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            queue_stale_after_secs: parse_or("QUEUE_STALE_AFTER_SECS", DEFAULT_STALE_AFTER_SECS)
                .context("QUEUE_STALE_AFTER_SECS must be a number of seconds")?,
            presence_window_secs: parse_or("PRESENCE_WINDOW_SECS", DEFAULT_PRESENCE_WINDOW_SECS)
                .context("PRESENCE_WINDOW_SECS must be a number of seconds")?,
            housekeeping_interval_secs: parse_or("HOUSEKEEPING_INTERVAL_SECS", 60)
                .context("HOUSEKEEPING_INTERVAL_SECS must be a number of seconds")?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => Ok(raw.trim().parse()?),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example ,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn missing_numeric_variable_falls_back_to_default() {
        let value: i64 = parse_or("ADMISSIONS_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
