//! Subprocess execution seam.
//!
//! The scanning core never spawns processes directly; it goes through a
//! [`ProcessRunner`] so fetch logic can be exercised without real `git`/`gh`
//! binaries. [`TokioProcessRunner`] is the production implementation.
//!
//! # Public API
//! - [`ProcessRunner`]: `run(executable, args, working_dir) -> ProcessOutput`
//! - [`ProcessOutput`]: Captured stdout/stderr/exit code
//! - [`TokioProcessRunner`]: Runner backed by `tokio::process::Command`
//! - [`ToolPaths`]: Resolved `git` and `gh` executables, cached per process

use crate::core::error::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program and captures its output.
///
/// Implementations must not block the async scheduler while the child runs.
/// A spawn failure is an `Err`; a non-zero exit is reported through
/// [`ProcessOutput::exit_code`] and interpreted by the caller.
pub trait ProcessRunner: Send + Sync + 'static {
    fn run(
        &self,
        executable: &Path,
        args: &[&str],
        working_dir: &Path,
    ) -> impl Future<Output = Result<ProcessOutput>> + Send;
}

/// Production runner on top of `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    fn run(
        &self,
        executable: &Path,
        args: &[&str],
        working_dir: &Path,
    ) -> impl Future<Output = Result<ProcessOutput>> + Send {
        let mut cmd = tokio::process::Command::new(executable);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(std::process::Stdio::null())
            // Children abandoned by a fetch time-out are reaped instead of lingering
            .kill_on_drop(true);

        async move {
            let output = cmd.output().await?;
            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            })
        }
    }
}

/// Locations of the external tools the fetcher drives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    pub git: Option<PathBuf>,
    pub gh: Option<PathBuf>,
}

static DETECTED_TOOLS: OnceLock<ToolPaths> = OnceLock::new();

impl ToolPaths {
    /// Resolve `git` and `gh` from `PATH` once for the lifetime of the process
    pub fn detect() -> &'static ToolPaths {
        DETECTED_TOOLS.get_or_init(|| {
            let tools = ToolPaths {
                git: which::which("git").ok(),
                gh: which::which("gh").ok(),
            };
            log::debug!("Resolved tools: git = {:?}, gh = {:?}", tools.git, tools.gh);
            if tools.git.is_none() {
                log::warn!("git executable not found in PATH; repository status will be empty");
            }
            tools
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_output_success() {
        assert!(ProcessOutput::success("ok").is_success());
        assert!(!ProcessOutput::failure(1, "bad").is_success());
        assert!(!ProcessOutput::default().is_success());
    }

    #[tokio::test]
    async fn test_tokio_runner_reports_exit_code() -> Result<()> {
        let Some(git) = ToolPaths::detect().git.clone() else {
            return Ok(());
        };
        let dir = tempfile::TempDir::new()?;
        let runner = TokioProcessRunner;

        let output = runner.run(&git, &["--version"], dir.path()).await?;
        assert!(output.is_success());
        assert!(output.stdout.starts_with("git version"));

        let output = runner.run(&git, &["rev-parse", "HEAD"], dir.path()).await?;
        assert!(!output.is_success());
        Ok(())
    }

    #[tokio::test]
    async fn test_tokio_runner_missing_executable_is_error() {
        let dir = std::env::temp_dir();
        let result = TokioProcessRunner
            .run(Path::new("/definitely/not/a/binary"), &[], &dir)
            .await;
        assert!(result.is_err());
    }
}
