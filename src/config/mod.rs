//! Configuration management for workerbridge
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use workerbridge::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Polling every {}", config.polling.interval);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `WORKERBRIDGE__<section>__<key>`
//!
//! Examples:
//! - `WORKERBRIDGE__WORKER__URL=https://worker.example/w/run`
//! - `WORKERBRIDGE__POLLING__TIMEOUT=15m`
//! - `WORKERBRIDGE__RUN__CONTINUE_ON_FAIL=true`
//!
//! The API key is only ever read from `MS_API_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/workerbridge.toml`.
//! This can be overridden using the `WORKERBRIDGE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, HttpSection, PollingConfig, RunConfig, WorkerConfig};
pub use validation::ValidationError;

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::pipeline::params;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_with_secrets(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Item parameter defaults derived from this configuration.
    ///
    /// Hosts layer per-item parameters over these.
    pub fn parameter_defaults(&self) -> Map<String, Value> {
        let mut defaults = Map::new();

        if let Some(ref url) = self.worker.url {
            defaults.insert(params::WORKER_URL.to_string(), json!(url));
        }
        if let Some(ref api_key) = self.worker.api_key {
            defaults.insert(params::API_KEY.to_string(), json!(api_key));
        }
        defaults.insert(
            params::API_VARIANT.to_string(),
            json!(self.worker.api_variant.to_string()),
        );
        defaults.insert(
            params::POLLING_INTERVAL.to_string(),
            json!(self.polling.interval.as_duration().as_secs_f64()),
        );
        defaults.insert(
            params::TIMEOUT.to_string(),
            json!(self.polling.timeout.as_duration().as_secs_f64()),
        );
        defaults.insert(
            params::WAIT_FOR_COMPLETION.to_string(),
            json!(self.run.wait_for_completion),
        );
        defaults.insert(
            params::AUTO_DOWNLOAD.to_string(),
            json!(self.run.auto_download),
        );
        defaults.insert(
            params::EMIT_PROGRESS.to_string(),
            json!(self.run.emit_progress),
        );
        defaults.insert(
            params::FAIL_ON_REMOTE_ERROR.to_string(),
            json!(self.run.fail_on_remote_error),
        );

        defaults
    }
}
