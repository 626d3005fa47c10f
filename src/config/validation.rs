use crate::config::types::{
    BackendConfig, CampaignConfig, Config, OutputConfig, PacingConfig, RetryConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_backend_config(&config.backend)?;
    validate_search_config(&config.search)?;
    validate_campaign_config(&config.campaign)?;
    validate_retry_config(&config.retry)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates backend connection settings
fn validate_backend_config(config: &BackendConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid backend url '{}': {}", config.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Backend url '{}' must use http or https",
            config.url
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    validate_seconds("settle_delay", config.settle_delay)?;

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.safesearch > 2 {
        return Err(ConfigError::Validation(format!(
            "safesearch must be 0, 1 or 2, got {}",
            config.safesearch
        )));
    }
    Ok(())
}

fn validate_campaign_config(config: &CampaignConfig) -> Result<(), ConfigError> {
    if config.quota < 1 {
        return Err(ConfigError::Validation(format!(
            "quota must be >= 1, got {}",
            config.quota
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    validate_seconds("retry multiplier", config.multiplier)?;
    validate_range("retry wait", config.min_wait, config.max_wait)
}

fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range("pacing delay", config.min_delay, config.max_delay)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.filename.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output filename cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    let title = config.title_column.trim();
    let url = config.url_column.trim();
    if title.is_empty() || url.is_empty() {
        return Err(ConfigError::Validation(
            "output column names cannot be empty".to_string(),
        ));
    }

    if title == url {
        return Err(ConfigError::Validation(format!(
            "title and url columns must differ, both are '{}'",
            title
        )));
    }

    Ok(())
}

/// A duration in seconds: finite and not negative
fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    validate_seconds(&format!("{} minimum", name), min)?;
    validate_seconds(&format!("{} maximum", name), max)?;

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{} minimum ({}) exceeds maximum ({})",
            name, min, max
        )));
    }

    Ok(())
}
