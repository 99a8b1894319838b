use crate::config::types::{Config, FetchConfig, ProxyConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_proxy_config(&config.proxy)?;
    Ok(())
}

/// Validates shared fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch.timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.enrichment_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch.enrichment-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.enrichment_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "fetch.enrichment-timeout-secs ({}) must not exceed fetch.timeout-secs ({})",
            config.enrichment_timeout_secs, config.timeout_secs
        )));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch.connect-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetch.user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_text_chars == 0 {
        return Err(ConfigError::Validation(
            "fetch.max-text-chars must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates proxy settings
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy endpoint must use http or https, got '{}'",
            endpoint.scheme()
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "proxy.timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "proxy.api-key cannot be empty; remove it to disable the proxy".to_string(),
        ));
    }

    if let Some(code) = &config.country_code {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "proxy.country-code must be a two-letter code, got '{}'",
                code
            )));
        }
    }

    Ok(())
}
