use crate::config::types::{CacheBackend, CacheConfig, Config, HttpConfig, SourcesConfig};
use crate::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_cache_config(&config.cache)?;
    validate_sources_config(&config.sources)?;
    validate_glyphs(&config.glyphs)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "ttl-secs must be >= 1, got {}",
            config.ttl_secs
        )));
    }

    if config.backend == CacheBackend::Sqlite {
        match config.sqlite_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(
                    "sqlite-path is required when backend = \"sqlite\"".to_string(),
                ))
            }
        }
    }

    Ok(())
}

/// Validates the archive base URLs
fn validate_sources_config(config: &SourcesConfig) -> Result<(), ConfigError> {
    validate_base_url("itkc-base-url", &config.itkc_base_url)?;
    validate_base_url("sillok-base-url", &config.sillok_base_url)?;
    Ok(())
}

fn validate_base_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            name, value
        )));
    }

    Ok(())
}

/// Validates the extra glyph table: `KC` codes mapping to one character each
fn validate_glyphs(glyphs: &HashMap<String, String>) -> Result<(), ConfigError> {
    for (code, value) in glyphs {
        let digits = code.strip_prefix("KC").unwrap_or("");
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "Glyph code '{}' must look like KC followed by digits",
                code
            )));
        }

        if value.chars().count() != 1 {
            return Err(ConfigError::Validation(format!(
                "Glyph '{}' must map to exactly one character, got '{}'",
                code, value
            )));
        }
    }

    Ok(())
}
