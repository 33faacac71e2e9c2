#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod aws;
mod error;
mod request;
mod signer;
mod swift;
pub mod transport;

pub use crate::aws::AwsSigner;
pub use crate::error::{SignError, SignResult};
pub use crate::request::{SignRequest, Verb};
pub use crate::signer::UrlSigner;
pub use crate::swift::SwiftSigner;

/// Tracing target for URL signing.
pub const TRACING_TARGET_SIGN: &str = "s3cli_sign::sign";
