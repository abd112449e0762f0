//! Text completion via an external CLI.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::generator::{GenError, TextGenerator};
use crate::subprocess::run_command;

/// Default time budget for a text completion.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Text generator that pipes the prompt to a CLI tool's stdin and reads
/// the completion from stdout.
#[derive(Debug, Clone)]
pub struct CliTextGenerator {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CliTextGenerator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TextGenerator for CliTextGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        let output = run_command(&mut cmd, Some(prompt.as_bytes()), self.timeout).await?;

        if output.exit_code != 0 {
            return Err(GenError::Failed {
                status: output.exit_code,
                stderr: output.stderr,
            });
        }

        let text = output.stdout.trim().to_string();
        if text.is_empty() {
            return Err(GenError::UnusableOutput(
                "text generator returned empty output".to_string(),
            ));
        }

        tracing::debug!(
            program = %self.program.display(),
            duration_ms = output.duration_ms,
            chars = text.len(),
            "text completion finished"
        );
        Ok(text)
    }
}
