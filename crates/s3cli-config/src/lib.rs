#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod credentials;
mod document;
mod error;
mod provider;
mod resolved;

pub use crate::credentials::{Credentials, CredentialsMode};
pub use crate::document::{ConfigDocument, ParsedConfig, SignatureVersion, TransferTuning};
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::provider::{Classification, DEFAULT_REGION, Provider, ProviderTable};
pub use crate::resolved::{AddressingStyle, EMPTY_REGION, ResolvedConfig, SigningScheme};

/// Tracing target for configuration document validation.
pub const TRACING_TARGET_DOCUMENT: &str = "s3cli_config::document";

/// Tracing target for endpoint classification.
pub const TRACING_TARGET_CLASSIFY: &str = "s3cli_config::classify";

/// Tracing target for configuration resolution.
pub const TRACING_TARGET_RESOLVE: &str = "s3cli_config::resolve";
