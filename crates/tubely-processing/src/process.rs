//! External process invocation.

use std::ffi::OsString;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs an external program to completion.
///
/// Dropping the returned future must stop the child.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<ProcessOutput>;
}

/// Runs programs with `tokio::process`, killing the child if the caller goes away.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    #[tracing::instrument(skip(self, args), fields(process.executable.name = %program))]
    async fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        let start = std::time::Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        tracing::debug!(
            exit_code = output.status.code(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Process finished"
        );

        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
