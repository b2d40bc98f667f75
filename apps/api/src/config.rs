use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::layout::grid::{GridShape, GRID_COLS, GRID_ROWS};

const DEFAULT_DATABASE_URL: &str = "sqlite:breeze.db";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 300;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub layout_persist_debounce: Duration,
    pub grid: GridShape,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let debounce_ms: u64 = parse_or(&lookup, "LAYOUT_PERSIST_DEBOUNCE_MS", DEFAULT_PERSIST_DEBOUNCE_MS)?;
        let cols: i32 = parse_or(&lookup, "GRID_COLS", GRID_COLS)?;
        let rows: i32 = parse_or(&lookup, "GRID_ROWS", GRID_ROWS)?;
        let grid = GridShape::new(cols, rows);
        if grid.is_degenerate() {
            bail!("GRID_COLS and GRID_ROWS must be positive (got {cols}x{rows})");
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            layout_persist_debounce: Duration::from_millis(debounce_ms),
            grid,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
