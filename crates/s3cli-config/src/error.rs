//! Configuration error types.

use crate::CredentialsMode;

/// Result type for configuration parsing and resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while reading and validating a configuration document.
///
/// Every variant is fatal to the invocation and is reported to the user
/// verbatim; none of them is retried.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum ConfigError {
    /// The configuration stream could not be read.
    #[error("failed to read configuration: {0}")]
    MalformedInput(#[source] std::io::Error),

    /// The configuration is not a valid JSON document.
    #[error("invalid configuration JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// `bucket_name` is missing or empty.
    #[error("bucket_name must be set")]
    MissingBucket,

    /// Static credentials were selected but one of the keys is empty.
    #[error("access_key_id and secret_access_key must be provided")]
    StaticCredentialsIncomplete,

    /// Keys were supplied together with a credentials source that forbids them.
    #[error("can't use access_key_id and secret_access_key with {0} credentials_source")]
    CredentialsConflict(CredentialsMode),

    /// `credentials_source` is not one of the recognized values.
    #[error("invalid credentials_source: {0}")]
    InvalidCredentialsSource(String),

    /// A transfer tuning value is negative.
    #[error("{field} must be greater than or equal to 0, got {value}")]
    InvalidTuningValue {
        /// Name of the offending document field.
        field: &'static str,
        /// Value found in the document.
        value: i64,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::MalformedInput(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_names_the_source() {
        let err = ConfigError::CredentialsConflict(CredentialsMode::EnvOrProfile);
        assert_eq!(
            err.to_string(),
            "can't use access_key_id and secret_access_key with env_or_profile credentials_source"
        );
    }

    #[test]
    fn tuning_value_message() {
        let err = ConfigError::InvalidTuningValue {
            field: "upload_part_size",
            value: -1,
        };
        assert_eq!(
            err.to_string(),
            "upload_part_size must be greater than or equal to 0, got -1"
        );
    }
}
