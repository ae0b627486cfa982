use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

use event_api::Envelope;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: Url,
    pub envelope: Envelope,
    pub admin_token: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let base_url = env::var("EVENT_API_BASE_URL")
            .context("EVENT_API_BASE_URL must be set")?
            .parse()
            .context("EVENT_API_BASE_URL must be a valid URL")?;

        let envelope = match env::var("EVENT_API_ENVELOPE") {
            Ok(value) => value.parse().map_err(anyhow::Error::msg)?,
            Err(_) => Envelope::default(),
        };

        Ok(Self {
            base_url,
            envelope,
            admin_token: env::var("EVENT_ADMIN_TOKEN").ok(),
        })
    }
}
