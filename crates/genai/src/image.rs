//! Image synthesis and background removal via external CLI tools.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::generator::{GenError, ImageSynthesizer};
use crate::subprocess::run_command;

/// Default time budget for image synthesis.
const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default time budget for background removal.
const DEFAULT_REMOVE_TIMEOUT: Duration = Duration::from_secs(120);

/// Icon edge length requested from the synthesis tool.
const ICON_SIZE: u32 = 128;

/// Image tooling backed by two external CLIs: a prompt-to-image
/// generator and a background remover.
///
/// The generator tool refuses to overwrite existing output files and
/// requires a `.jpg` output extension; callers handle both by passing
/// uniquely named temp paths (see the pipeline's publish helpers).
#[derive(Debug, Clone)]
pub struct CliImageTool {
    generate_bin: PathBuf,
    remove_bin: PathBuf,
    generate_timeout: Duration,
    remove_timeout: Duration,
}

impl CliImageTool {
    pub fn new(generate_bin: impl Into<PathBuf>, remove_bin: impl Into<PathBuf>) -> Self {
        Self {
            generate_bin: generate_bin.into(),
            remove_bin: remove_bin.into(),
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
            remove_timeout: DEFAULT_REMOVE_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, generate: Duration, remove: Duration) -> Self {
        self.generate_timeout = generate;
        self.remove_timeout = remove;
        self
    }
}

#[async_trait]
impl ImageSynthesizer for CliImageTool {
    async fn generate(&self, prompt: &str, output: &Path) -> Result<(), GenError> {
        let mut cmd = Command::new(&self.generate_bin);
        cmd.arg("--prompt")
            .arg(prompt)
            .arg("--width")
            .arg(ICON_SIZE.to_string())
            .arg("--height")
            .arg(ICON_SIZE.to_string())
            .arg("--output")
            .arg(output);

        let result = run_command(&mut cmd, None, self.generate_timeout).await?;
        if result.exit_code != 0 {
            return Err(GenError::Failed {
                status: result.exit_code,
                stderr: result.stderr,
            });
        }

        // The tool can exit zero without writing anything (e.g. refused
        // output path); treat that as unusable output.
        if !output.exists() {
            return Err(GenError::UnusableOutput(format!(
                "image generator wrote nothing to {}",
                output.display()
            )));
        }

        tracing::debug!(
            output = %output.display(),
            duration_ms = result.duration_ms,
            "image synthesis finished"
        );
        Ok(())
    }

    async fn remove_background(&self, input: &Path, output: &Path) -> Result<(), GenError> {
        let mut cmd = Command::new(&self.remove_bin);
        cmd.arg(input).arg(output);

        let result = run_command(&mut cmd, None, self.remove_timeout).await?;
        if result.exit_code != 0 {
            return Err(GenError::Failed {
                status: result.exit_code,
                stderr: result.stderr,
            });
        }

        if !output.exists() {
            return Err(GenError::UnusableOutput(format!(
                "background remover wrote nothing to {}",
                output.display()
            )));
        }

        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = result.duration_ms,
            "background removal finished"
        );
        Ok(())
    }
}
