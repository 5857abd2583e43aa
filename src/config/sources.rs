use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "WORKERBRIDGE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/workerbridge.toml";
const ENV_PREFIX: &str = "WORKERBRIDGE";
const ENV_SEPARATOR: &str = "__";
const API_KEY_ENV_VAR: &str = "MS_API_KEY";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_with_secrets(config_path)
}

/// Load a specific file plus environment, including secrets
pub fn load_with_secrets(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_env_files(&config_path);

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);
    Ok(config)
}

/// `.env` from the working directory, then one beside the config file.
/// Variables already set are never overwritten.
fn load_env_files(config_path: &Path) {
    // Ignore errors if the files don't exist
    let _ = dotenvy::dotenv();
    if let Some(dir) = config_path.parent() {
        let _ = dotenvy::from_path(dir.join(".env"));
    }
}

/// Secrets are never read from TOML files, only from the environment
fn load_secrets(config: &mut Config) {
    if let Ok(api_key) = env::var(API_KEY_ENV_VAR) {
        if !api_key.trim().is_empty() {
            config.worker.api_key = Some(api_key);
        }
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // WORKERBRIDGE__POLLING__INTERVAL -> polling.interval
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
