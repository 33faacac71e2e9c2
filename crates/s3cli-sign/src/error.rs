//! Signing error types.

/// Result type for URL signing.
pub type SignResult<T> = Result<T, SignError>;

/// Errors that can occur while selecting a signer or signing a URL.
///
/// Signing errors are fatal to the invocation; nothing here is retried.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum SignError {
    /// Only `GET` and `PUT` URLs can be signed.
    #[error("unsupported verb {0:?}, only GET and PUT URLs can be signed")]
    UnsupportedVerb(String),

    /// Temporary URLs need a host to point at.
    #[error("host must be set to sign OpenStack temporary URLs")]
    MissingHost,

    /// Temporary URLs need the account's temp URL key.
    #[error("swift_temp_url_key must be set to sign OpenStack temporary URLs")]
    MissingTempUrlKey,

    /// The endpoint does not form a valid object URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The expiry does not fit in the supported timestamp range.
    #[error("invalid expiry: {0}")]
    InvalidExpiry(#[source] jiff::Error),

    /// The delegated signer could not be configured.
    #[error("failed to configure signer: {0}")]
    Configuration(#[from] s3cli_object::Error),

    /// The delegated signer could not obtain credentials.
    #[error("failed to sign url: {0}")]
    Credentials(#[source] object_store::Error),
}
