//! Fast-start remuxing with ffmpeg.

use std::ffi::OsString;
use std::sync::Arc;

use tubely_core::AppError;

use crate::process::ProcessRunner;
use crate::stager::{StagedFile, StreamStager};

/// Rewrites an MP4 so the `moov` atom precedes the media data.
///
/// Samples are stream-copied, never re-encoded.
#[derive(Clone)]
pub struct FastStartRemuxer {
    runner: Arc<dyn ProcessRunner>,
    ffmpeg_path: String,
    stager: StreamStager,
}

impl FastStartRemuxer {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        ffmpeg_path: impl Into<String>,
        stager: StreamStager,
    ) -> Self {
        Self {
            runner,
            ffmpeg_path: ffmpeg_path.into(),
            stager,
        }
    }

    /// Produce a new staged file with the remuxed container.
    ///
    /// The input is left in place; the output is removed if ffmpeg fails.
    #[tracing::instrument(skip(self, input), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart",
        input_bytes = input.size_bytes()
    ))]
    pub async fn remux_for_streaming(&self, input: &StagedFile) -> Result<StagedFile, AppError> {
        let start = std::time::Instant::now();
        let output_path = self.stager.reserve(".mp4")?;

        let mut args: Vec<OsString> = vec!["-y".into(), "-v".into(), "error".into(), "-i".into()];
        args.push(input.path().as_os_str().to_owned());
        args.extend(
            ["-map", "0", "-c", "copy", "-movflags", "+faststart", "-f", "mp4"]
                .iter()
                .map(OsString::from),
        );
        args.push(output_path.as_os_str().to_owned());

        let output = self
            .runner
            .run(&self.ffmpeg_path, &args)
            .await
            .map_err(|e| AppError::ProcessingFailed(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.success {
            let stderr = output.stderr_lossy();
            tracing::error!(exit_code = output.code, stderr = %stderr, "ffmpeg faststart failed");
            return Err(AppError::ProcessingFailed(format!(
                "ffmpeg exited with {:?}: {}",
                output.code, stderr
            )));
        }

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        if size_bytes == 0 {
            return Err(AppError::ProcessingFailed(
                "ffmpeg produced an empty file".to_string(),
            ));
        }

        tracing::info!(
            output_bytes = size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video remuxed for fast start"
        );

        Ok(StagedFile::new(output_path, size_bytes))
    }
}
