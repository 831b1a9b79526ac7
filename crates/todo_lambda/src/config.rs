use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SIGNED_URL_EXPIRATION_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Deployment settings read from the Lambda environment at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub table_name: String,
    pub index_name: String,
    pub attachment_bucket: String,
    pub signed_url_expiration: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let signed_url_expiration = match lookup("SIGNED_URL_EXPIRATION") {
            None => DEFAULT_SIGNED_URL_EXPIRATION_SECS,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "SIGNED_URL_EXPIRATION",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            table_name: required("TODOS_TABLE")?,
            index_name: required("TODOS_INDEX_NAME")?,
            attachment_bucket: required("ATTACHMENT_S3_BUCKET")?,
            signed_url_expiration: Duration::from_secs(signed_url_expiration),
        })
    }
}
