//! AWS-style query-string signing.
//!
//! Canonical request construction and the HMAC chain are delegated to
//! [`object_store::signer::Signer`] on an `AmazonS3` store configured exactly
//! like the data-transfer client. The delegated signer only implements SigV4,
//! so `signature_version = "2"` configurations also get SigV4 URLs.

use object_store::aws::AmazonS3;
use object_store::path::Path;
use object_store::signer::Signer;
use s3cli_config::{AddressingStyle, ResolvedConfig, SigningScheme};
use s3cli_object::S3Provider;
use url::Url;

use crate::TRACING_TARGET_SIGN;
use crate::error::{SignError, SignResult};
use crate::request::SignRequest;

/// Signs URLs for AWS S3 and S3-compatible endpoints.
#[derive(Debug)]
pub struct AwsSigner {
    store: AmazonS3,
    config: ResolvedConfig,
}

impl AwsSigner {
    /// Builds the delegated store from `config`.
    pub fn new(config: &ResolvedConfig) -> SignResult<Self> {
        if config.signing_scheme == SigningScheme::AwsV2 {
            tracing::debug!(
                target: TRACING_TARGET_SIGN,
                "signature version 2 requested, pre-signing with version 4"
            );
        }

        Ok(Self {
            store: S3Provider::build(config)?,
            config: config.clone(),
        })
    }

    /// Returns a URL granting `request.verb` on the folder-prefixed key.
    ///
    /// Anonymous configurations get the unsigned object URL.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Credentials`] if credentials cannot be retrieved.
    pub async fn sign(&self, request: &SignRequest) -> SignResult<String> {
        let key = self.config.object_key(&request.object_key);

        if self.config.credentials.is_anonymous() {
            let url = object_url(&self.config, &key)?;
            tracing::debug!(
                target: TRACING_TARGET_SIGN,
                verb = %request.verb,
                key = %key,
                "anonymous access, returning unsigned url"
            );
            return Ok(url.into());
        }

        let url = self
            .store
            .signed_url(request.verb.method(), &Path::from(key.as_str()), request.expiry)
            .await
            .map_err(SignError::Credentials)?;

        tracing::debug!(
            target: TRACING_TARGET_SIGN,
            verb = %request.verb,
            key = %key,
            expiry_secs = request.expiry.as_secs(),
            "signed object url"
        );

        Ok(url.into())
    }
}

/// Returns the plain object URL for `key` under the configured addressing style.
fn object_url(config: &ResolvedConfig, key: &str) -> SignResult<Url> {
    let endpoint = config.endpoint_url().unwrap_or_else(|| {
        let scheme = if config.use_ssl { "https" } else { "http" };
        format!("{scheme}://s3.{}.amazonaws.com", config.signing_region())
    });
    let invalid = || SignError::InvalidEndpoint(endpoint.clone());

    let mut url = Url::parse(&endpoint).map_err(|_| invalid())?;
    if config.addressing_style == AddressingStyle::VirtualHostStyle {
        let host = url.host_str().ok_or_else(invalid)?;
        let bucket_prefix = format!("{}.", config.bucket_name);
        if !host.starts_with(&bucket_prefix) {
            let host = format!("{bucket_prefix}{host}");
            url.set_host(Some(&host)).map_err(|_| invalid())?;
        }
    }

    {
        let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
        segments.pop_if_empty();
        if config.addressing_style == AddressingStyle::PathStyle {
            segments.push(&config.bucket_name);
        }
        segments.extend(key.split('/'));
    }

    Ok(url)
}
