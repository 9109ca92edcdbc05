use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default except `CAREER_KB_PATH` and `DATABASE_URL`,
/// which fall back to the embedded career table and the in-memory sink.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub career_kb_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            model_path: optional_env("MODEL_PATH")
                .unwrap_or_else(|| "career_model.json".to_string())
                .into(),
            career_kb_path: optional_env("CAREER_KB_PATH").map(PathBuf::from),
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
