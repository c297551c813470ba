//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a usable `target_base`
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! Returns every problem found, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target_base is not configured")]
    MissingTarget,

    #[error("target_base {0:?} is not an absolute URL: {1}")]
    InvalidTarget(String, String),

    #[error("target_base {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("bind_host must not be empty")]
    EmptyBindHost,

    #[error("timeouts.upstream_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Parse `target_base` as an absolute http(s) URL with a host.
///
/// Surrounding whitespace is ignored.
pub fn parse_target_base(target_base: &str) -> Result<Url, ValidationError> {
    let target = target_base.trim();
    if target.is_empty() {
        return Err(ValidationError::MissingTarget);
    }

    let url = Url::parse(target)
        .map_err(|e| ValidationError::InvalidTarget(target.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(target.to_string()));
    }
    if url.host_str().is_none() {
        return Err(ValidationError::InvalidTarget(
            target.to_string(),
            "missing host".to_string(),
        ));
    }
    Ok(url)
}

/// Check a configuration, collecting all errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_target_base(&config.target_base) {
        errors.push(e);
    }

    if config.bind_host.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
