//! Configuration validation

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate a resolved configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_cache(config)?;
    validate_http(config)?;
    validate_sources(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_cache(config: &Config) -> Result<()> {
    if config.cache.capacity == 0 {
        return Err(ConfigError::InvalidValue {
            field: "cache.capacity".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    if config.cache.dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.dir".to_string()).into());
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<()> {
    if config.http.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "http.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }
    Ok(())
}

fn validate_sources(config: &Config) -> Result<()> {
    if let Some(jira) = &config.sources.jira {
        if !(jira.instance_url.starts_with("http://") || jira.instance_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "sources.jira.instance_url".to_string(),
                message: format!("'{}' is not an http(s) URL", jira.instance_url),
            }
            .into());
        }

        if jira.access_token.is_empty() {
            warn!("sources.jira.access_token is empty, jira requests carry an empty bearer token");
        }
    }

    if let Some(google) = &config.sources.google {
        if google.credentials_path.as_os_str().is_empty() {
            return Err(
                ConfigError::MissingField("sources.google.credentials_path".to_string()).into(),
            );
        }
        if google.token_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("sources.google.token_path".to_string()).into());
        }
    }

    Ok(())
}
