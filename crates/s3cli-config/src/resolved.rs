//! Fully resolved connection profile.

use std::io::Read;

use strum::{AsRefStr, Display};

use crate::document::{ConfigDocument, ParsedConfig, SignatureVersion, TransferTuning};
use crate::error::ConfigResult;
use crate::provider::{Classification, Provider, ProviderTable};
use crate::{Credentials, TRACING_TARGET_RESOLVE};

/// Region placeholder handed to signing libraries when no region applies.
pub const EMPTY_REGION: &str = " ";

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// Where the bucket name goes in request URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AddressingStyle {
    /// `host/bucket/key`.
    PathStyle,
    /// `bucket.host/key`.
    VirtualHostStyle,
}

/// Protocol used to pre-sign URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SigningScheme {
    AwsV4,
    AwsV2,
    SwiftHmacSha1,
    SwiftHmacSha256,
}

impl SigningScheme {
    /// Returns whether the scheme is an OpenStack temporary-URL scheme.
    #[inline]
    pub fn is_swift(self) -> bool {
        matches!(self, Self::SwiftHmacSha1 | Self::SwiftHmacSha256)
    }
}

/// Immutable connection profile shared by every downstream component.
///
/// Built once per invocation from a configuration document and a
/// [`ProviderTable`]. Resolving the same document twice yields equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub bucket_name: String,
    pub folder_name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub region: Option<String>,
    pub provider: Provider,
    pub addressing_style: AddressingStyle,
    pub signing_scheme: SigningScheme,
    pub multipart_eligible: bool,
    pub swift_auth_account: Option<String>,
    pub swift_temp_url_key: Option<String>,
    pub ceph_compatible: bool,
    pub use_ssl: bool,
    pub ssl_verify_peer: bool,
    pub tuning: TransferTuning,
    pub assume_role_arn: Option<String>,
    pub server_side_encryption: Option<String>,
    pub sse_kms_key_id: Option<String>,
}

impl ParsedConfig {
    /// Classifies the endpoint and derives the remaining connection settings.
    pub fn resolve(self, table: &ProviderTable) -> ResolvedConfig {
        let classification = match self.host.as_deref() {
            Some(host) => table.classify(host),
            None => Classification::default(),
        };

        let region = self.region.or(classification.region);

        let mut signing_scheme = match (self.signature_version, &self.host) {
            (Some(SignatureVersion::V2), _) => SigningScheme::AwsV2,
            (Some(SignatureVersion::V4), _) => SigningScheme::AwsV4,
            (None, None) => SigningScheme::AwsV4,
            (None, Some(_)) if classification.provider == Provider::Aws => SigningScheme::AwsV4,
            (None, Some(_)) => SigningScheme::AwsV2,
        };

        let multipart_eligible = self
            .multipart_upload
            .unwrap_or_else(|| classification.provider.supports_multipart());

        let addressing_style = match self.host_style {
            Some(true) => AddressingStyle::VirtualHostStyle,
            Some(false) => AddressingStyle::PathStyle,
            None if classification.provider.prefers_virtual_host() => {
                AddressingStyle::VirtualHostStyle
            }
            None => AddressingStyle::PathStyle,
        };

        let mut provider = classification.provider;
        if self.swift_auth_account.is_some() && self.swift_temp_url_key.is_some() {
            signing_scheme = if self.ceph_compatible {
                SigningScheme::SwiftHmacSha1
            } else {
                SigningScheme::SwiftHmacSha256
            };
            if provider == Provider::Generic {
                provider = Provider::OpenStackSwift;
            }
        }

        let resolved = ResolvedConfig {
            credentials: self.credentials,
            bucket_name: self.bucket_name,
            folder_name: self.folder_name,
            host: self.host,
            port: self.port,
            region,
            provider,
            addressing_style,
            signing_scheme,
            multipart_eligible,
            swift_auth_account: self.swift_auth_account,
            swift_temp_url_key: self.swift_temp_url_key,
            ceph_compatible: self.ceph_compatible,
            use_ssl: self.use_ssl,
            ssl_verify_peer: self.ssl_verify_peer,
            tuning: self.tuning,
            assume_role_arn: self.assume_role_arn,
            server_side_encryption: self.server_side_encryption,
            sse_kms_key_id: self.sse_kms_key_id,
        };

        tracing::debug!(
            target: TRACING_TARGET_RESOLVE,
            provider = %resolved.provider,
            region = ?resolved.region,
            addressing_style = %resolved.addressing_style,
            signing_scheme = %resolved.signing_scheme,
            multipart_eligible = resolved.multipart_eligible,
            "configuration resolved"
        );

        resolved
    }
}

impl ResolvedConfig {
    /// Reads, validates and resolves a configuration document.
    ///
    /// # Errors
    ///
    /// Propagates every [`ConfigError`](crate::ConfigError) raised by the
    /// document parser.
    pub fn from_reader(reader: impl Read, table: &ProviderTable) -> ConfigResult<Self> {
        Ok(ConfigDocument::from_reader(reader)?.resolve(table))
    }

    /// Validates and resolves a configuration document held in memory.
    pub fn from_slice(bytes: &[u8], table: &ProviderTable) -> ConfigResult<Self> {
        Ok(ConfigDocument::from_slice(bytes)?.resolve(table))
    }

    /// Returns whether region-based configuration applies.
    #[inline]
    pub fn use_region(&self) -> bool {
        self.region.is_some()
    }

    /// Returns the region to hand to a signing library.
    pub fn signing_region(&self) -> &str {
        self.region.as_deref().unwrap_or(EMPTY_REGION)
    }

    /// Returns the endpoint override as `host[:port]`, if a host is set.
    ///
    /// The port is left out when it is the default for the scheme selected by
    /// `use_ssl`.
    pub fn endpoint(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let default_port = if self.use_ssl { HTTPS_PORT } else { HTTP_PORT };
        Some(match self.port {
            Some(port) if port != default_port => format!("{host}:{port}"),
            _ => host.to_owned(),
        })
    }

    /// Returns the endpoint override as an absolute URL.
    ///
    /// The scheme follows `use_ssl` unless the host already carries one.
    pub fn endpoint_url(&self) -> Option<String> {
        let endpoint = self.endpoint()?;
        if endpoint.contains("://") {
            return Some(endpoint);
        }
        let scheme = if self.use_ssl { "https" } else { "http" };
        Some(format!("{scheme}://{endpoint}"))
    }

    /// Prefixes `key` with the configured folder, if any.
    pub fn object_key(&self, key: &str) -> String {
        match self.folder_name.as_deref() {
            Some(folder) => format!("{}/{key}", folder.trim_end_matches('/')),
            None => key.to_owned(),
        }
    }
}
