use crate::config::types::{BackoffConfig, Config, ServiceConfig, WorkflowConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound for any single idle backoff wait (one day)
const MAX_BACKOFF_WAIT_SECS: f64 = 86_400.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_workflow_config(&config.workflow)?;
    validate_backoff_config(&config.backoff)?;
    validate_service_config(&config.service)?;
    validate_capture_params(config)?;
    Ok(())
}

/// Validates retry budgets and timeouts
fn validate_workflow_config(config: &WorkflowConfig) -> ConfigResult<()> {
    if config.job_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "job-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.poll_courtesy_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "poll-courtesy-delay-ms must be <= 60000, got {}",
            config.poll_courtesy_delay_ms
        )));
    }

    Ok(())
}

/// Validates the idle-poll backoff curve
fn validate_backoff_config(config: &BackoffConfig) -> ConfigResult<()> {
    if !config.initial_wait_secs.is_finite() || config.initial_wait_secs <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff initial-wait-secs must be positive, got {}",
            config.initial_wait_secs
        )));
    }

    if !config.factor.is_finite() || config.factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff factor must be >= 1.0, got {}",
            config.factor
        )));
    }

    if !config.max_wait_secs.is_finite() || config.max_wait_secs < config.initial_wait_secs {
        return Err(ConfigError::Validation(format!(
            "backoff max-wait-secs ({}) must be >= initial-wait-secs ({})",
            config.max_wait_secs, config.initial_wait_secs
        )));
    }

    if config.max_wait_secs > MAX_BACKOFF_WAIT_SECS {
        return Err(ConfigError::Validation(format!(
            "backoff max-wait-secs must be <= {}, got {}",
            MAX_BACKOFF_WAIT_SECS, config.max_wait_secs
        )));
    }

    Ok(())
}

/// Validates endpoints and client settings
fn validate_service_config(config: &ServiceConfig) -> ConfigResult<()> {
    validate_endpoint("save-endpoint", &config.save_endpoint)?;
    validate_endpoint("status-endpoint", &config.status_endpoint)?;

    if config.playback_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "playback-prefix cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs and connect-timeout-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates that an endpoint is an absolute http(s) URL
fn validate_endpoint(name: &str, endpoint: &str) -> ConfigResult<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, endpoint
        )));
    }

    Ok(())
}

/// `url` is always set by the client; a capture param must not shadow it
fn validate_capture_params(config: &Config) -> ConfigResult<()> {
    for key in config.capture_params.keys() {
        if key.is_empty() || key == "url" {
            return Err(ConfigError::Validation(format!(
                "capture-params cannot contain the key '{}'",
                key
            )));
        }
    }
    Ok(())
}
