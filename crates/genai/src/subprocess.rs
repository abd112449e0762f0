//! Shared subprocess execution for generator CLIs.
//!
//! Both generator clients spawn external tools; this module owns the
//! common spawn + stdin + capture + timeout handling.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::generator::GenError;

/// Maximum stdout or stderr size captured per stream (4 MiB).
///
/// Output beyond this is truncated so a runaway tool cannot exhaust
/// memory.
const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// Captured result of a finished generator process.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// Spawn `cmd`, optionally pipe `stdin_bytes` to its stdin, capture both
/// output streams, and enforce `timeout`.
///
/// The caller configures program and arguments; `kill_on_drop(true)` is
/// set here so a timed-out child is killed when dropped.
pub async fn run_command(
    cmd: &mut Command,
    stdin_bytes: Option<&[u8]>,
    timeout: Duration,
) -> Result<CommandOutput, GenError> {
    cmd.stdin(if stdin_bytes.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(GenError::Spawn)?;

    if let Some(bytes) = stdin_bytes {
        if let Some(mut stdin) = child.stdin.take() {
            // Best-effort write; a tool that closes stdin early is not an error.
            let _ = stdin.write_all(bytes).await;
            drop(stdin);
        }
    }

    // Read streams in spawned tasks so `child.wait()` can run concurrently.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

    let wait_result = tokio::time::timeout(timeout, child.wait()).await;

    match wait_result {
        Ok(Ok(status)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            let stdout_bytes = stdout_task.await.unwrap_or_default();
            let stderr_bytes = stderr_task.await.unwrap_or_default();
            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
                exit_code: status.code().unwrap_or(-1),
                duration_ms,
            })
        }
        Ok(Err(e)) => Err(GenError::Spawn(e)),
        Err(_elapsed) => {
            // Timeout expired; dropping `child` kills the process.
            Err(GenError::Timeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            })
        }
    }
}

/// Read an entire output stream, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}
