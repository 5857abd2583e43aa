use super::models::Config;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Polling interval must be positive")]
    ZeroPollingInterval,

    #[error("Polling timeout ({timeout:?}) is shorter than the interval ({interval:?})")]
    TimeoutShorterThanInterval {
        timeout: Duration,
        interval: Duration,
    },

    #[error("Invalid worker URL scheme in '{url}', expected 'http://' or 'https://'")]
    InvalidWorkerScheme { url: String },

    #[error("HTTP user agent must not be empty")]
    EmptyUserAgent,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_polling(config)?;
    validate_worker(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_polling(config: &Config) -> Result<(), ValidationError> {
    let interval = config.polling.interval.as_duration();
    let timeout = config.polling.timeout.as_duration();

    if interval.is_zero() {
        return Err(ValidationError::ZeroPollingInterval);
    }

    if timeout < interval {
        return Err(ValidationError::TimeoutShorterThanInterval { timeout, interval });
    }

    Ok(())
}

fn validate_worker(config: &Config) -> Result<(), ValidationError> {
    if let Some(ref url) = config.worker.url {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidWorkerScheme {
                url: url.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_interval() {
        let mut config = Config::default();
        config.polling.interval = HumanDuration::from_secs(0);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroPollingInterval)
        ));
    }

    #[test]
    fn test_timeout_shorter_than_interval() {
        let mut config = Config::default();
        config.polling.interval = HumanDuration::from_secs(10);
        config.polling.timeout = HumanDuration::from_secs(5);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::TimeoutShorterThanInterval { .. })
        ));

        config.polling.timeout = HumanDuration::from_secs(10);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_worker_scheme() {
        let mut config = Config::default();
        config.worker.url = Some("ftp://worker.example/w".to_string());
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidWorkerScheme { .. })
        ));

        config.worker.url = Some("https://worker.example/w/run".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(matches!(validate(&config), Err(ValidationError::EmptyUserAgent)));
    }
}
