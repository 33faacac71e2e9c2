//! Blobstore command handlers.

use std::path::Path;

use anyhow::Context;
use s3cli_config::ResolvedConfig;
use s3cli_object::{BlobstoreClient, S3Provider};
use s3cli_sign::{SignRequest, UrlSigner};
use tokio::fs::File;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{Command, parse_duration};

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command completed.
    Done,
    /// The object looked up by `exists` does not exist.
    Missing,
    /// A line to print on standard output.
    Print(String),
}

/// Runs `command` against the configured blobstore.
pub async fn execute(command: Command, config: &ResolvedConfig) -> anyhow::Result<Outcome> {
    match command {
        Command::Put { src, object_id } => put(&connect(config)?, &src, &object_id).await,
        Command::Get { object_id, dst } => get(&connect(config)?, &object_id, &dst).await,
        Command::Delete { object_id } => delete(&connect(config)?, &object_id).await,
        Command::Exists { object_id } => exists(&connect(config)?, &object_id).await,
        Command::Sign {
            object_id,
            action,
            expiry,
        } => sign(config, &object_id, &action, &expiry).await,
    }
}

fn connect(config: &ResolvedConfig) -> anyhow::Result<BlobstoreClient> {
    S3Provider::connect(config).context("failed to create object store client")
}

/// Uploads the file at `src` as `object_id`.
pub async fn put(client: &BlobstoreClient, src: &Path, object_id: &str) -> anyhow::Result<Outcome> {
    let file = File::open(src)
        .await
        .with_context(|| format!("failed to open {}", src.display()))?;
    let size = client
        .put(file, object_id)
        .await
        .with_context(|| format!("failed to upload {object_id}"))?;

    tracing::info!(target: TRACING_TARGET_COMMAND, object_id, size, "object uploaded");
    Ok(Outcome::Done)
}

/// Downloads `object_id` into the file at `dst`.
pub async fn get(client: &BlobstoreClient, object_id: &str, dst: &Path) -> anyhow::Result<Outcome> {
    let file = File::create(dst)
        .await
        .with_context(|| format!("failed to create {}", dst.display()))?;
    let size = client
        .get(object_id, file)
        .await
        .with_context(|| format!("failed to download {object_id}"))?;

    tracing::info!(target: TRACING_TARGET_COMMAND, object_id, size, "object downloaded");
    Ok(Outcome::Done)
}

/// Deletes `object_id`.
pub async fn delete(client: &BlobstoreClient, object_id: &str) -> anyhow::Result<Outcome> {
    client
        .delete(object_id)
        .await
        .with_context(|| format!("failed to delete {object_id}"))?;

    tracing::info!(target: TRACING_TARGET_COMMAND, object_id, "object deleted");
    Ok(Outcome::Done)
}

/// Looks up `object_id`.
pub async fn exists(client: &BlobstoreClient, object_id: &str) -> anyhow::Result<Outcome> {
    let found = client
        .exists(object_id)
        .await
        .with_context(|| format!("failed to check existence of {object_id}"))?;

    if found {
        tracing::info!(target: TRACING_TARGET_COMMAND, object_id, "object exists");
        Ok(Outcome::Done)
    } else {
        tracing::info!(target: TRACING_TARGET_COMMAND, object_id, "object does not exist");
        Ok(Outcome::Missing)
    }
}

/// Produces a pre-signed URL for `object_id`.
pub async fn sign(
    config: &ResolvedConfig,
    object_id: &str,
    action: &str,
    expiry: &str,
) -> anyhow::Result<Outcome> {
    let expiry = parse_duration(expiry)?;
    let request = SignRequest::parse(object_id, action, expiry)?;
    let signer = UrlSigner::select(config).context("failed to create url signer")?;
    let url = signer
        .sign(&request)
        .await
        .with_context(|| format!("failed to sign {object_id}"))?;

    Ok(Outcome::Print(url))
}
