use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub autosave_interval_secs: u64,
    pub local_draft_dir: PathBuf,
    pub export_margin_mm: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            autosave_interval_secs: 5,
            local_draft_dir: PathBuf::from(".vitae"),
            export_margin_mm: 10.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            autosave_interval_secs: parse_env(
                "AUTOSAVE_INTERVAL_SECS",
                defaults.autosave_interval_secs,
            )?,
            local_draft_dir: std::env::var("LOCAL_DRAFT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_draft_dir),
            export_margin_mm: parse_env("EXPORT_MARGIN_MM", defaults.export_margin_mm)?,
        };

        anyhow::ensure!(
            config.autosave_interval_secs > 0,
            "AUTOSAVE_INTERVAL_SECS must be at least 1"
        );
        anyhow::ensure!(
            (0.0..105.0).contains(&config.export_margin_mm),
            "EXPORT_MARGIN_MM must be between 0 and 105"
        );
        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
