//! Stream staging into scratch files.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tubely_core::AppError;

const SCRATCH_PREFIX: &str = "tubely-";

/// A file in the scratch directory owned by one pipeline invocation.
///
/// The file is removed when this value is dropped, whichever way the
/// invocation ends.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size_bytes: u64,
}

impl StagedFile {
    pub(crate) fn new(path: TempPath, size_bytes: u64) -> Self {
        Self { path, size_bytes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Open the staged content for reading.
    pub async fn open(&self) -> Result<tokio::fs::File, AppError> {
        Ok(tokio::fs::File::open(&self.path).await?)
    }
}

/// Writes inbound byte streams to the scratch directory.
#[derive(Debug, Clone)]
pub struct StreamStager {
    scratch_dir: PathBuf,
}

impl StreamStager {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Reserve an empty scratch file. Used for process outputs.
    pub fn reserve(&self, suffix: &str) -> Result<TempPath, AppError> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        let file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(&self.scratch_dir)?;
        Ok(file.into_temp_path())
    }

    /// Copy `stream` into a new scratch file, failing once it exceeds `byte_limit`.
    ///
    /// On any error the partial file is removed before returning.
    #[tracing::instrument(skip(self, stream), fields(scratch_dir = %self.scratch_dir.display()))]
    pub async fn stage<R>(
        &self,
        stream: R,
        byte_limit: u64,
        suffix: &str,
    ) -> Result<StagedFile, AppError>
    where
        R: AsyncRead + Unpin,
    {
        let start = std::time::Instant::now();
        let path = self.reserve(suffix)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        // One byte past the limit is enough to tell "at limit" from "over".
        let mut limited = stream.take(byte_limit.saturating_add(1));
        let copied = tokio::io::copy(&mut limited, &mut file).await.map_err(|e| {
            tracing::warn!(error = %e, "Upload stream copy failed");
            AppError::Io(e)
        })?;

        if copied > byte_limit {
            tracing::debug!(byte_limit, "Upload exceeded byte limit, discarding");
            return Err(AppError::PayloadTooLarge {
                size_limit: byte_limit,
            });
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tracing::debug!(
            path = %path.display(),
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedFile::new(path, copied))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::ReadBuf;

    pub(crate) fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    /// Yields some bytes, then fails like a dropped connection.
    struct BrokenStream {
        sent: bool,
    }

    impl AsyncRead for BrokenStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "client went away",
                )))
            } else {
                self.sent = true;
                buf.put_slice(b"partial");
                Poll::Ready(Ok(()))
            }
        }
    }

    #[tokio::test]
    async fn test_stage_within_limit() {
        let dir = tempdir().unwrap();
        let stager = StreamStager::new(dir.path());

        let staged = stager.stage(&b"hello"[..], 5, ".mp4").await.unwrap();
        assert_eq!(staged.size_bytes(), 5);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"hello");
        assert!(staged.path().to_string_lossy().ends_with(".mp4"));

        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stage_over_limit_leaves_nothing() {
        let dir = tempdir().unwrap();
        let stager = StreamStager::new(dir.path());

        let err = stager.stage(&b"too many bytes"[..], 4, ".mp4").await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { size_limit: 4 }));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_stage_broken_stream_is_io_error() {
        let dir = tempdir().unwrap();
        let stager = StreamStager::new(dir.path());

        let err = stager
            .stage(BrokenStream { sent: false }, 1024, ".png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_one_file_per_call() {
        let dir = tempdir().unwrap();
        let stager = StreamStager::new(dir.path());

        let a = stager.stage(&b"a"[..], 10, ".png").await.unwrap();
        let b = stager.stage(&b"b"[..], 10, ".png").await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(scratch_entries(dir.path()), 2);
    }
}
