use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub study: StudyConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// Publish notifications and consume voice events over NATS
    pub enabled: bool,
    pub url: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "nats://localhost:4222".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Seat rows in the classroom grid
    pub rows: usize,
    /// Seats per row
    pub columns: usize,
    /// JSON file holding completed-session records
    pub log_path: PathBuf,
    /// Refuse to start a session for users who are not in a voice channel
    pub require_voice: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 3,
            log_path: PathBuf::from("learning_log.json"),
            require_voice: true,
        }
    }
}

impl Config {
    /// Load configuration from `path` (any format the `config` crate
    /// understands), then apply `STUDY_MATE__SECTION__KEY` overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("STUDY_MATE").separator("__").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
