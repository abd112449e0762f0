//! Supervisor CLI scanning.
//!
//! The external supervisor lists its processes in a fixed-width table:
//!
//! ```text
//! NAME                       PID   PORT
//! process-name              1234   8080
//! another-process           5678      -
//! ```
//!
//! [`parse_ps_output`] turns that into rows; [`SupervisorCli`] runs the
//! command and enriches rows with the workdir recorded in the
//! supervisor's own state file.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

/// One row of supervisor `ps` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedProcess {
    pub name: String,
    pub pid: u32,
    pub port: Option<u16>,
    pub workdir: Option<PathBuf>,
}

/// Errors from running or parsing the supervisor CLI.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to run supervisor command: {0}")]
    Spawn(std::io::Error),

    #[error("supervisor command exited with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    #[error("supervisor command timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

/// Parse the tabular output of the supervisor's `ps` subcommand.
///
/// The header line is skipped. Rows are whitespace-split into
/// NAME PID PORT; a port of `-` means the process has no port.
/// Malformed rows are skipped rather than failing the scan.
pub fn parse_ps_output(output: &str) -> Vec<ScannedProcess> {
    let mut lines = output.trim().lines();
    // Header line.
    if lines.next().is_none() {
        return Vec::new();
    }

    let mut processes = Vec::new();
    for line in lines {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(pid_str), Some(port_str)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let Ok(pid) = pid_str.parse::<u32>() else {
            continue;
        };

        let port = if port_str == "-" {
            None
        } else {
            match port_str.parse::<u16>() {
                Ok(p) => Some(p),
                Err(_) => continue,
            }
        };

        processes.push(ScannedProcess {
            name: name.to_string(),
            pid,
            port,
            workdir: None,
        });
    }

    processes
}

/// Handle on the external supervisor CLI.
#[derive(Debug, Clone)]
pub struct SupervisorCli {
    program: String,
    args: Vec<String>,
    /// Path to the supervisor's own state file, consulted for workdirs.
    state_path: PathBuf,
    timeout: Duration,
}

impl SupervisorCli {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        state_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            state_path: state_path.into(),
            timeout,
        }
    }

    /// Run the supervisor `ps` command and return processes that expose
    /// a port, each enriched with its workdir when known.
    pub async fn scan(&self) -> Result<Vec<ScannedProcess>, ScanError> {
        let output = self.run_ps().await?;
        let mut processes: Vec<ScannedProcess> = parse_ps_output(&output)
            .into_iter()
            .filter(|p| p.port.is_some())
            .collect();

        for process in &mut processes {
            process.workdir = self.workdir_for(&process.name).await;
        }

        tracing::debug!(count = processes.len(), "supervisor scan parsed");
        Ok(processes)
    }

    /// Spawn the CLI and capture stdout, enforcing the configured timeout.
    async fn run_ps(&self) -> Result<String, ScanError> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(ScanError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScanError::Timeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            })?
            .map_err(ScanError::Spawn)?;

        if !output.status.success() {
            return Err(ScanError::CommandFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Look up a process workdir in the supervisor's state file.
    ///
    /// Best-effort: any read or parse failure yields `None`.
    async fn workdir_for(&self, name: &str) -> Option<PathBuf> {
        let bytes = tokio::fs::read(&self.state_path).await.ok()?;
        let state: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        state
            .get("processes")?
            .get(name)?
            .get("workdir")?
            .as_str()
            .map(PathBuf::from)
    }
}
