//! Container inspection with ffprobe.

use std::ffi::OsString;
use std::sync::Arc;

use serde::Deserialize;
use tubely_core::models::Orientation;
use tubely_core::AppError;

use crate::process::ProcessRunner;
use crate::stager::StagedFile;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Reads stream dimensions from a staged container. Never modifies the file.
#[derive(Clone)]
pub struct ContainerInspector {
    runner: Arc<dyn ProcessRunner>,
    ffprobe_path: String,
}

impl ContainerInspector {
    pub fn new(runner: Arc<dyn ProcessRunner>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffprobe_path: ffprobe_path.into(),
        }
    }

    fn probe_args(staged: &StagedFile) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(staged.path().as_os_str().to_owned());
        args
    }

    /// Width and height of the first reported video stream.
    #[tracing::instrument(skip(self, staged), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe_dimensions(&self, staged: &StagedFile) -> Result<(u32, u32), AppError> {
        let output = self
            .runner
            .run(&self.ffprobe_path, &Self::probe_args(staged))
            .await
            .map_err(|e| AppError::UnreadableMedia(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.success {
            let stderr = output.stderr_lossy();
            tracing::warn!(exit_code = output.code, stderr = %stderr, "ffprobe failed");
            return Err(AppError::UnreadableMedia(format!("ffprobe failed: {}", stderr)));
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout).map_err(|e| {
            AppError::UnreadableMedia(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let stream = probe
            .streams
            .first()
            .ok_or_else(|| AppError::UnreadableMedia("No video stream found".to_string()))?;

        match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(AppError::UnreadableMedia(
                "Video stream has no dimensions".to_string(),
            )),
        }
    }

    /// Classify the staged video as landscape, portrait or other.
    pub async fn inspect_orientation(&self, staged: &StagedFile) -> Result<Orientation, AppError> {
        let (width, height) = self.probe_dimensions(staged).await?;
        let orientation = Orientation::classify(width, height);
        tracing::info!(width, height, orientation = %orientation, "Video probe completed");
        Ok(orientation)
    }
}
