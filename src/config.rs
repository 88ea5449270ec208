//! Startup configuration for the data platform connection.
//!
//! The platform endpoint and credential are required; the service refuses to
//! start without them rather than starting and failing on the first request.

use std::env;

/// The environment variable holding the data platform's base URL.
pub const PLATFORM_URL_VAR: &str = "PLATFORM_URL";
/// The environment variable holding the privileged platform credential.
pub const PLATFORM_SERVICE_KEY_VAR: &str = "PLATFORM_SERVICE_KEY";
/// The environment variable naming the receipt storage bucket.
pub const RECEIPT_BUCKET_VAR: &str = "RECEIPT_BUCKET";

const DEFAULT_RECEIPT_BUCKET: &str = "receipts";

/// The configuration the service needs to talk to the data platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The base URL of the hosted data platform.
    pub platform_url: String,
    /// The privileged access credential for the platform.
    pub service_key: String,
    /// The storage bucket that receipt images are uploaded into.
    pub receipt_bucket: String,
}

/// The ways startup configuration can be missing or malformed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("the environment variable {0} must be set")]
    Missing(&'static str),

    /// The platform URL does not look like an http(s) URL.
    #[error("{0} must be an http(s) URL, got {1:?}")]
    InvalidUrl(&'static str, String),
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns a [ConfigError] if the platform URL or service key is absent
    /// or malformed. Callers should treat this as fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let platform_url = require(&lookup, PLATFORM_URL_VAR)?;

        if !platform_url.starts_with("http://") && !platform_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(PLATFORM_URL_VAR, platform_url));
        }

        let service_key = require(&lookup, PLATFORM_SERVICE_KEY_VAR)?;

        let receipt_bucket = lookup(RECEIPT_BUCKET_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_RECEIPT_BUCKET.to_owned());

        Ok(Self {
            platform_url,
            service_key,
            receipt_bucket,
        })
    }
}

fn require(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}
