//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── config: PathBuf    # JSON blobstore configuration (-c, S3CLI_CONFIG)
//! └── command: Command   # put | get | delete | exists | sign
//! ```

mod duration;

use std::fs::File;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use s3cli_config::{ProviderTable, ResolvedConfig};

pub use self::duration::parse_duration;
use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "s3cli")]
#[command(about = "Blobstore adapter for S3-compatible object storage")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Path to the JSON configuration document.
    #[arg(short = 'c', long = "config", env = "S3CLI_CONFIG", value_name = "FILE")]
    pub config: PathBuf,

    /// Print version information.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Blobstore operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Blobstore operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Upload a local file.
    Put {
        /// File to upload.
        src: PathBuf,
        /// Destination object id.
        object_id: String,
    },
    /// Download an object into a local file.
    Get {
        /// Object to download.
        object_id: String,
        /// File to write.
        dst: PathBuf,
    },
    /// Delete an object.
    Delete {
        /// Object to delete.
        object_id: String,
    },
    /// Check whether an object exists; exits with 3 if it does not.
    Exists {
        /// Object to look up.
        object_id: String,
    },
    /// Print a pre-signed URL for an object.
    Sign {
        /// Object to sign.
        object_id: String,
        /// Verb the URL is valid for (`get` or `put`).
        action: String,
        /// Validity period, e.g. `1h`, `60m` or `3600s`.
        expiry: String,
    },
}

impl Command {
    /// Returns the subcommand name for log records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Put { .. } => "put",
            Self::Get { .. } => "get",
            Self::Delete { .. } => "delete",
            Self::Exists { .. } => "exists",
            Self::Sign { .. } => "sign",
        }
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Reads and resolves the configuration document.
    pub fn load_config(&self, table: &ProviderTable) -> anyhow::Result<ResolvedConfig> {
        let file = File::open(&self.config)
            .with_context(|| format!("failed to open config file {}", self.config.display()))?;
        let config = ResolvedConfig::from_reader(file, table)
            .with_context(|| format!("invalid config file {}", self.config.display()))?;

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            path = %self.config.display(),
            bucket = %config.bucket_name,
            provider = %config.provider,
            credentials_source = %config.credentials.mode,
            "configuration loaded"
        );

        Ok(config)
    }

    /// Logs build information at debug level.
    pub fn log_build_info(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            command = self.command.name(),
            features = ?Self::enabled_features(),
            "build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
