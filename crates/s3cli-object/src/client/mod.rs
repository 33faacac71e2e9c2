//! Blobstore client backed by [`object_store::ObjectStore`].
//!
//! [`BlobstoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` that carries the transfer settings of a
//! [`ResolvedConfig`]: folder prefix, multipart eligibility, part sizes and
//! concurrency. Every public method is instrumented with [`tracing`].

use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload, WriteMultipart};
use s3cli_config::{ResolvedConfig, TransferTuning};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TRACING_TARGET_TRANSFER;
use crate::types::{Error, Result};

/// Part size used for multipart uploads when none is configured.
pub const DEFAULT_UPLOAD_PART_SIZE: usize = 5 * 1024 * 1024;

/// Parts kept in flight by uploads and ranged downloads when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Size of the buffer used to read the upload source.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Cloneable handle performing blobstore operations against one bucket.
#[derive(Clone, Debug)]
pub struct BlobstoreClient {
    store: Arc<dyn ObjectStore>,
    folder_name: Option<String>,
    multipart: bool,
    tuning: TransferTuning,
}

impl BlobstoreClient {
    /// Wraps a concrete [`ObjectStore`] with the transfer settings of `config`.
    pub fn new(store: impl ObjectStore, config: &ResolvedConfig) -> Self {
        Self {
            store: Arc::new(store),
            folder_name: config.folder_name.clone(),
            multipart: config.multipart_eligible,
            tuning: config.tuning,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Returns the store path of `key`, prefixed with the configured folder.
    pub fn path(&self, key: &str) -> Path {
        match self.folder_name.as_deref() {
            Some(folder) => Path::from(format!("{}/{key}", folder.trim_end_matches('/'))),
            None => Path::from(key),
        }
    }

    /// Uploads everything `reader` yields to `key` and returns the byte count.
    ///
    /// Multipart-eligible uploads stream through a multipart upload with the
    /// configured part size and concurrency, and are aborted on failure.
    /// Other uploads are buffered in memory and sent as one request, so a
    /// single-part upload needs memory for the whole object and is bounded by
    /// the provider's single-request size limit (5 GiB on S3-compatible APIs).
    #[tracing::instrument(name = "object.put", skip(self, reader), fields(key, multipart = self.multipart))]
    pub async fn put<R>(&self, mut reader: R, key: &str) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let path = self.path(key);
        if !self.multipart {
            let mut data = Vec::new();
            reader.read_to_end(&mut data).await?;
            let size = data.len() as u64;
            self.store
                .put(&path, PutPayload::from(Bytes::from(data)))
                .await?;
            tracing::debug!(target: TRACING_TARGET_TRANSFER, %path, size, "single-part upload complete");
            return Ok(size);
        }

        let part_size = positive(self.tuning.upload_part_size).unwrap_or(DEFAULT_UPLOAD_PART_SIZE);
        let concurrency = positive(self.tuning.upload_concurrency).unwrap_or(DEFAULT_CONCURRENCY);

        let upload = self.store.put_multipart(&path).await?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, part_size);
        let mut buffer = vec![0; READ_BUFFER_SIZE];
        let mut size = 0u64;

        loop {
            let read = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) => {
                    abort(writer, &path).await;
                    return Err(err.into());
                }
            };
            if let Err(err) = writer.wait_for_capacity(concurrency).await {
                abort(writer, &path).await;
                return Err(err.into());
            }
            writer.write(&buffer[..read]);
            size += read as u64;
        }

        writer.finish().await?;
        tracing::debug!(
            target: TRACING_TARGET_TRANSFER,
            %path,
            size,
            part_size,
            concurrency,
            "multipart upload complete"
        );
        Ok(size)
    }

    /// Downloads `key` into `writer` and returns the byte count.
    ///
    /// With a configured download part size the object is fetched as
    /// concurrent ranged requests and written in order.
    #[tracing::instrument(name = "object.get", skip(self, writer), fields(key))]
    pub async fn get<W>(&self, key: &str, mut writer: W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let path = self.path(key);
        let size = match positive(self.tuning.download_part_size) {
            Some(part_size) => self.get_ranged(&path, part_size, &mut writer).await?,
            None => {
                let mut stream = self.store.get(&path).await?.into_stream();
                let mut size = 0u64;
                while let Some(chunk) = stream.try_next().await? {
                    writer.write_all(&chunk).await?;
                    size += chunk.len() as u64;
                }
                size
            }
        };

        writer.flush().await?;
        tracing::debug!(target: TRACING_TARGET_TRANSFER, %path, size, "download complete");
        Ok(size)
    }

    async fn get_ranged<W>(&self, path: &Path, part_size: usize, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let concurrency =
            positive(self.tuning.download_concurrency).unwrap_or(DEFAULT_CONCURRENCY);
        let total = self.store.head(path).await?.size;

        let mut parts = stream::iter(part_ranges(total, part_size as u64))
            .map(|range| self.store.get_range(path, range))
            .buffered(concurrency);

        let mut size = 0u64;
        while let Some(part) = parts.try_next().await? {
            writer.write_all(&part).await?;
            size += part.len() as u64;
        }
        Ok(size)
    }

    /// Deletes `key`.
    #[tracing::instrument(name = "object.delete", skip(self), fields(key))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        self.store.delete(&path).await?;
        Ok(())
    }

    /// Returns whether `key` exists; a not-found response is `false`.
    #[tracing::instrument(name = "object.exists", skip(self), fields(key))]
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path(key);
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(Error::from(err)),
        }
    }
}

async fn abort(writer: WriteMultipart, path: &Path) {
    if let Err(err) = writer.abort().await {
        tracing::warn!(
            target: TRACING_TARGET_TRANSFER,
            %path,
            error = %err,
            "failed to abort multipart upload"
        );
    }
}

fn positive(value: Option<u64>) -> Option<usize> {
    value
        .filter(|value| *value > 0)
        .map(|value| usize::try_from(value).unwrap_or(usize::MAX))
}

fn part_ranges(total: u64, part_size: u64) -> impl Iterator<Item = Range<u64>> {
    (0..total)
        .step_by(part_size.max(1) as usize)
        .map(move |start| start..total.min(start + part_size))
}
