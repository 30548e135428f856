//! Toolchain Invocation
//!
//! Runs the platform's preprocessor over the synthetic translation unit
//! and writes the reduced declaration file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::inline::collapse_expanded_inlines;
use super::reduce::reduce;
use crate::platform::{Platform, PlatformError};

/// Header generation errors
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Toolchain executable not found: {0}")]
    ToolNotFound(String),

    #[error("'{tool}' failed:\n{diagnostics}")]
    ToolFailed { tool: String, diagnostics: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generates the reduced declaration file for one platform.
pub struct HeaderGenerator {
    platform: Platform,
    output: PathBuf,
}

impl HeaderGenerator {
    /// Create a generator writing to the given declaration-file path
    pub fn new(platform: Platform, output: impl AsRef<Path>) -> Self {
        Self {
            platform,
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Path of the declaration file this generator maintains
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Generate the declaration file only if it does not exist yet
    pub fn ensure(&self) -> Result<(), PreprocessError> {
        if self.output.exists() {
            return Ok(());
        }
        self.generate()
    }

    /// Run the full pipeline and (re)write the declaration file
    pub fn generate(&self) -> Result<(), PreprocessError> {
        let mut command = self.platform.preprocessor_command();
        if let Some(config) = self.platform.magick_config_command() {
            let cflags = run_tool(&config, None)?;
            command.extend(cflags.split_whitespace().map(|s| s.to_string()));
        }
        command.extend(self.platform.include_flags());

        let expanded = self.preprocess(&command)?;
        let collapsed = collapse_expanded_inlines(&expanded);
        let reduced = reduce(self.platform, &collapsed);
        fs::write(&self.output, reduced)?;
        Ok(())
    }

    /// Write the translation unit to a scratch file and preprocess it
    fn preprocess(&self, command: &[String]) -> Result<String, PreprocessError> {
        let mut unit = tempfile::Builder::new()
            .prefix("wandbind")
            .suffix(".c")
            .tempfile()?;
        unit.write_all(self.platform.translation_unit().as_bytes())?;
        unit.flush()?;
        run_tool(command, Some(unit.path()))
    }
}

/// Run an external tool and capture its stdout.
///
/// A missing executable and a non-zero exit are both fatal; the latter
/// carries the tool's diagnostic output verbatim.
fn run_tool(argv: &[String], input: Option<&Path>) -> Result<String, PreprocessError> {
    let exe =
        which::which(&argv[0]).map_err(|_| PreprocessError::ToolNotFound(argv[0].clone()))?;

    let mut command = Command::new(exe);
    command.args(&argv[1..]);
    if let Some(path) = input {
        command.arg(path);
    }

    let output = command.output()?;
    if !output.status.success() {
        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if diagnostics.trim().is_empty() {
            diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        }
        return Err(PreprocessError::ToolFailed {
            tool: argv[0].clone(),
            diagnostics,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
