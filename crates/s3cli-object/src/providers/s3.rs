//! S3-compatible provider using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, Alibaba Cloud OSS, Google Cloud Storage interoperability
//! endpoints, Ceph RGW, MinIO and any other S3-compatible service.

use object_store::ClientOptions;
use object_store::aws::{AmazonS3, AmazonS3Builder, AmazonS3ConfigKey};
use s3cli_config::{AddressingStyle, CredentialsMode, ResolvedConfig};

use crate::TRACING_TARGET_PROVIDER;
use crate::client::BlobstoreClient;
use crate::types::{Error, Result};

/// Configuration key naming the server-side encryption type.
const SSE_TYPE_KEY: &str = "aws_server_side_encryption";

/// Configuration key naming the KMS key used for server-side encryption.
const SSE_KMS_KEY_ID_KEY: &str = "aws_sse_kms_key_id";

/// Factory for `AmazonS3` stores configured from a [`ResolvedConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Provider;

impl S3Provider {
    /// Identifier used in log records.
    pub const ID: &str = "s3";

    /// Translates the resolved configuration into builder options.
    ///
    /// With no region the placeholder region is used, and a custom endpoint
    /// gets the bucket inserted as a sub-domain for virtual-host addressing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an encryption option cannot be mapped
    /// onto a builder key.
    pub fn builder(config: &ResolvedConfig) -> Result<AmazonS3Builder> {
        let mut builder = match config.credentials.mode {
            CredentialsMode::EnvOrProfile => AmazonS3Builder::from_env(),
            CredentialsMode::Static | CredentialsMode::None => AmazonS3Builder::new(),
        };

        builder = builder
            .with_bucket_name(&config.bucket_name)
            .with_region(config.signing_region())
            .with_virtual_hosted_style_request(
                config.addressing_style == AddressingStyle::VirtualHostStyle,
            )
            .with_allow_http(!config.use_ssl);

        if let Some(endpoint) = endpoint_url(config) {
            builder = builder.with_endpoint(endpoint);
        }

        if !config.ssl_verify_peer {
            builder = builder
                .with_client_options(ClientOptions::new().with_allow_invalid_certificates(true));
        }

        match config.credentials.static_keys() {
            Some((access_key_id, secret_access_key)) => {
                builder = builder
                    .with_access_key_id(access_key_id)
                    .with_secret_access_key(secret_access_key);
            }
            None if config.credentials.is_anonymous() => {
                builder = builder.with_skip_signature(true);
            }
            None => {}
        }

        if let Some(role_arn) = &config.assume_role_arn {
            tracing::warn!(
                target: TRACING_TARGET_PROVIDER,
                role_arn = %role_arn,
                "assume_role_arn is honored only through the ambient web identity chain"
            );
        }

        if let Some(sse) = &config.server_side_encryption {
            builder = builder.with_config(config_key(SSE_TYPE_KEY)?, sse);
        }

        if let Some(key_id) = &config.sse_kms_key_id {
            builder = builder.with_config(config_key(SSE_KMS_KEY_ID_KEY)?, key_id);
        }

        Ok(builder)
    }

    /// Builds the `AmazonS3` store.
    pub fn build(config: &ResolvedConfig) -> Result<AmazonS3> {
        let store = Self::builder(config)?
            .build()
            .map_err(|e| Error::configuration(&e).with_source(e))?;

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            provider = Self::ID,
            bucket = %config.bucket_name,
            region = config.signing_region(),
            endpoint = ?config.endpoint(),
            addressing_style = %config.addressing_style,
            credentials_source = %config.credentials.mode,
            "object store built"
        );

        Ok(store)
    }

    /// Builds the store and wraps it in a [`BlobstoreClient`].
    pub fn connect(config: &ResolvedConfig) -> Result<BlobstoreClient> {
        let store = Self::build(config)?;
        Ok(BlobstoreClient::new(store, config))
    }
}

/// Parses a builder configuration key from its string form.
fn config_key(name: &str) -> Result<AmazonS3ConfigKey> {
    name.parse()
        .map_err(|e: object_store::Error| Error::configuration(&e).with_source(e))
}

/// Returns the endpoint URL handed to the builder, if the configuration has a host.
fn endpoint_url(config: &ResolvedConfig) -> Option<String> {
    let url = config.endpoint_url()?;
    if config.addressing_style == AddressingStyle::PathStyle {
        return Some(url);
    }

    let (scheme, authority) = url.split_once("://")?;
    let bucket_prefix = format!("{}.", config.bucket_name);
    if authority.starts_with(&bucket_prefix) {
        return Some(url);
    }
    Some(format!("{scheme}://{bucket_prefix}{authority}"))
}

#[cfg(test)]
mod tests {
    use s3cli_config::ProviderTable;

    use super::*;

    fn resolve(json: &str) -> ResolvedConfig {
        ResolvedConfig::from_slice(json.as_bytes(), &ProviderTable::new()).unwrap()
    }

    fn value(builder: &AmazonS3Builder, key: AmazonS3ConfigKey) -> Option<String> {
        builder.get_config_value(&key)
    }

    #[test]
    fn path_style_custom_endpoint() {
        let config = resolve(
            r#"{"bucket_name": "blobs", "host": "minio.local", "port": 9000, "use_ssl": false,
                "access_key_id": "id", "secret_access_key": "secret"}"#,
        );
        let builder = S3Provider::builder(&config).unwrap();

        assert_eq!(value(&builder, AmazonS3ConfigKey::Bucket).as_deref(), Some("blobs"));
        assert_eq!(
            value(&builder, AmazonS3ConfigKey::Endpoint).as_deref(),
            Some("http://minio.local:9000")
        );
        assert_eq!(value(&builder, AmazonS3ConfigKey::Region).as_deref(), Some(" "));
        assert_eq!(
            value(&builder, AmazonS3ConfigKey::VirtualHostedStyleRequest).as_deref(),
            Some("false")
        );
        assert_eq!(value(&builder, AmazonS3ConfigKey::AccessKeyId).as_deref(), Some("id"));
    }

    #[test]
    fn virtual_host_endpoint_includes_bucket() {
        let config = resolve(r#"{"bucket_name": "blobs", "host": "s3.us-east-2.amazonaws.com"}"#);
        assert_eq!(
            endpoint_url(&config).as_deref(),
            Some("https://blobs.s3.us-east-2.amazonaws.com")
        );

        let config = resolve(
            r#"{"bucket_name": "blobs", "host": "blobs.s3.us-east-2.amazonaws.com"}"#,
        );
        assert_eq!(
            endpoint_url(&config).as_deref(),
            Some("https://blobs.s3.us-east-2.amazonaws.com")
        );
    }

    #[test]
    fn region_only_has_no_endpoint() {
        let config = resolve(r#"{"bucket_name": "blobs", "region": "eu-west-1"}"#);
        let builder = S3Provider::builder(&config).unwrap();
        assert_eq!(endpoint_url(&config), None);
        assert_eq!(
            value(&builder, AmazonS3ConfigKey::Region).as_deref(),
            Some("eu-west-1")
        );
    }

    #[test]
    fn anonymous_skips_signature() {
        let config = resolve(r#"{"bucket_name": "blobs", "host": "some-host"}"#);
        let builder = S3Provider::builder(&config).unwrap();
        assert_eq!(
            value(&builder, AmazonS3ConfigKey::SkipSignature).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn server_side_encryption() {
        let config = resolve(
            r#"{"bucket_name": "blobs", "server_side_encryption": "aws:kms",
                "sse_kms_key_id": "some-key"}"#,
        );
        let builder = S3Provider::builder(&config).unwrap();
        assert_eq!(
            value(&builder, config_key(SSE_TYPE_KEY).unwrap()).as_deref(),
            Some("aws:kms")
        );
        assert_eq!(
            value(&builder, config_key(SSE_KMS_KEY_ID_KEY).unwrap()).as_deref(),
            Some("some-key")
        );
        S3Provider::build(&config).unwrap();
    }

    #[test]
    fn unknown_config_key_is_a_configuration_error() {
        let err = config_key("aws_not_a_key").unwrap_err();
        assert!(err.to_string().starts_with("[configuration]"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn builds_store() {
        let config = resolve(
            r#"{"bucket_name": "blobs", "host": "some-host", "ssl_verify_peer": false,
                "access_key_id": "id", "secret_access_key": "secret"}"#,
        );
        S3Provider::build(&config).unwrap();
        S3Provider::connect(&config).unwrap();
    }
}
