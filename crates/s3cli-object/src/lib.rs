#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Blobstore operations on top of any [`object_store::ObjectStore`].
pub mod client;
/// Object storage provider factories.
pub mod providers;
/// Error and result types.
pub mod types;

pub use client::BlobstoreClient;
pub use providers::S3Provider;
pub use types::{Error, Result};

/// Tracing target for store construction.
pub const TRACING_TARGET_PROVIDER: &str = "s3cli_object::provider";

/// Tracing target for data transfers.
pub const TRACING_TARGET_TRANSFER: &str = "s3cli_object::transfer";
