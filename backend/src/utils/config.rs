use anyhow::Result;
use std::env;
use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_NOTIFY_CHANNEL_CAPACITY, DEFAULT_SERVER_PORT};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
    pub notify_channel_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            notify_channel_capacity: env::var("NOTIFY_CHANNEL_CAPACITY")
                .ok()
                .and_then(|value| value.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_NOTIFY_CHANNEL_CAPACITY),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
