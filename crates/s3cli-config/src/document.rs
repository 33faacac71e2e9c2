//! Raw configuration document and its validation.

use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::provider::DEFAULT_REGION;
use crate::{Credentials, CredentialsMode, TRACING_TARGET_DOCUMENT};

/// Value of `openstack_blobstore_type` that selects Ceph compatibility.
const CEPH_BLOBSTORE_TYPE: &str = "ceph";

/// Explicit `signature_version` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SignatureVersion {
    /// AWS signature version 2.
    #[serde(rename = "2")]
    V2,
    /// AWS signature version 4.
    #[serde(rename = "4")]
    V4,
}

/// The JSON configuration document, as written by the operator.
///
/// Every field is optional in the JSON; empty strings mean "not set".
/// Use [`ConfigDocument::validate`] (or one of the `from_*` constructors) to
/// obtain a [`ParsedConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub credentials_source: String,
    pub host: String,
    /// 0 means no custom port.
    pub port: u16,
    pub region: String,
    pub folder_name: String,
    pub use_ssl: bool,
    pub ssl_verify_peer: bool,
    pub multipart_upload: Option<bool>,
    pub host_style: Option<bool>,
    pub signature_version: Option<SignatureVersion>,
    pub swift_auth_account: String,
    pub swift_temp_url_key: String,
    pub openstack_blobstore_type: String,
    pub download_concurrency: Option<i64>,
    pub upload_concurrency: Option<i64>,
    pub download_part_size: Option<i64>,
    pub upload_part_size: Option<i64>,
    pub assume_role_arn: String,
    pub server_side_encryption: String,
    pub sse_kms_key_id: String,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: String::new(),
            credentials_source: String::new(),
            host: String::new(),
            port: 0,
            region: String::new(),
            folder_name: String::new(),
            use_ssl: true,
            ssl_verify_peer: true,
            multipart_upload: None,
            host_style: None,
            signature_version: None,
            swift_auth_account: String::new(),
            swift_temp_url_key: String::new(),
            openstack_blobstore_type: String::new(),
            download_concurrency: None,
            upload_concurrency: None,
            download_part_size: None,
            upload_part_size: None,
            assume_role_arn: String::new(),
            server_side_encryption: String::new(),
            sse_kms_key_id: String::new(),
        }
    }
}

/// Transfer tuning knobs for the data-transfer client.
///
/// `None` leaves the choice to the object-storage library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferTuning {
    pub download_concurrency: Option<u64>,
    pub upload_concurrency: Option<u64>,
    pub download_part_size: Option<u64>,
    pub upload_part_size: Option<u64>,
}

/// A validated document, ready for endpoint classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    pub credentials: Credentials,
    pub bucket_name: String,
    pub folder_name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Explicit region, or the default when neither region nor host is set.
    pub region: Option<String>,
    pub use_ssl: bool,
    pub ssl_verify_peer: bool,
    pub multipart_upload: Option<bool>,
    pub host_style: Option<bool>,
    pub signature_version: Option<SignatureVersion>,
    pub swift_auth_account: Option<String>,
    pub swift_temp_url_key: Option<String>,
    pub ceph_compatible: bool,
    pub tuning: TransferTuning,
    pub assume_role_arn: Option<String>,
    pub server_side_encryption: Option<String>,
    pub sse_kms_key_id: Option<String>,
}

impl ConfigDocument {
    /// Reads and validates a document from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedInput`] if the stream cannot be read and
    /// [`ConfigError::InvalidJson`] if it is not a valid document, followed by
    /// any validation error.
    pub fn from_reader(mut reader: impl Read) -> ConfigResult<ParsedConfig> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_slice(&bytes)
    }

    /// Parses and validates a document held in memory.
    pub fn from_slice(bytes: &[u8]) -> ConfigResult<ParsedConfig> {
        let document: Self = serde_json::from_slice(bytes)?;
        document.validate()
    }

    /// Applies the validation rules in order; the first violation wins.
    pub fn validate(self) -> ConfigResult<ParsedConfig> {
        if self.bucket_name.is_empty() {
            return Err(ConfigError::MissingBucket);
        }

        let credentials = self.credentials()?;
        let tuning = TransferTuning {
            download_concurrency: non_negative("download_concurrency", self.download_concurrency)?,
            upload_concurrency: non_negative("upload_concurrency", self.upload_concurrency)?,
            download_part_size: non_negative("download_part_size", self.download_part_size)?,
            upload_part_size: non_negative("upload_part_size", self.upload_part_size)?,
        };

        let host = non_empty(self.host);
        let region = match non_empty(self.region) {
            Some(region) => Some(region),
            None if host.is_none() => Some(DEFAULT_REGION.to_owned()),
            None => None,
        };

        let parsed = ParsedConfig {
            credentials,
            bucket_name: self.bucket_name,
            folder_name: non_empty(self.folder_name),
            host,
            port: (self.port != 0).then_some(self.port),
            region,
            use_ssl: self.use_ssl,
            ssl_verify_peer: self.ssl_verify_peer,
            multipart_upload: self.multipart_upload,
            host_style: self.host_style,
            signature_version: self.signature_version,
            swift_auth_account: non_empty(self.swift_auth_account),
            swift_temp_url_key: non_empty(self.swift_temp_url_key),
            ceph_compatible: self
                .openstack_blobstore_type
                .eq_ignore_ascii_case(CEPH_BLOBSTORE_TYPE),
            tuning,
            assume_role_arn: non_empty(self.assume_role_arn),
            server_side_encryption: non_empty(self.server_side_encryption),
            sse_kms_key_id: non_empty(self.sse_kms_key_id),
        };

        tracing::debug!(
            target: TRACING_TARGET_DOCUMENT,
            bucket = %parsed.bucket_name,
            credentials_source = %parsed.credentials.mode,
            host = ?parsed.host,
            region = ?parsed.region,
            "configuration document validated"
        );

        Ok(parsed)
    }

    fn credentials(&self) -> ConfigResult<Credentials> {
        let has_key_id = !self.access_key_id.is_empty();
        let has_secret = !self.secret_access_key.is_empty();

        let mode = if self.credentials_source.is_empty() {
            if has_key_id && has_secret {
                CredentialsMode::Static
            } else {
                CredentialsMode::None
            }
        } else {
            CredentialsMode::from_str(&self.credentials_source).map_err(|_| {
                ConfigError::InvalidCredentialsSource(self.credentials_source.clone())
            })?
        };

        match mode {
            CredentialsMode::Static if !(has_key_id && has_secret) => {
                Err(ConfigError::StaticCredentialsIncomplete)
            }
            CredentialsMode::Static => Ok(Credentials::fixed(
                self.access_key_id.clone(),
                self.secret_access_key.clone(),
            )),
            CredentialsMode::EnvOrProfile | CredentialsMode::None if has_key_id || has_secret => {
                Err(ConfigError::CredentialsConflict(mode))
            }
            CredentialsMode::EnvOrProfile | CredentialsMode::None => Ok(Credentials::keyless(mode)),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn non_negative(field: &'static str, value: Option<i64>) -> ConfigResult<Option<u64>> {
    match value {
        None => Ok(None),
        Some(value) => u64::try_from(value)
            .map(Some)
            .map_err(|_| ConfigError::InvalidTuningValue { field, value }),
    }
}
