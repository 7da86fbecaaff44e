//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitFleetError`] which covers every failure mode of the
//! scanning core. It uses `thiserror` for ergonomic error definitions and includes
//! constructors for the common failure scenarios.
//!
//! # Public API
//! - [`GitFleetError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitFleetError>`
//!
//! # Error Categories
//! - **Repository operations**: Missing `.git` entry, dirty working tree on branch switch
//! - **Subprocess calls**: Non-zero exit, time-outs, missing executables
//! - **Cache operations**: Invalid (routine rescan signal), corrupt, I/O failures
//! - **Configuration**: Config directory and root path bookkeeping

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Domain-specific error types for git-fleet
#[derive(Error, Debug)]
pub enum GitFleetError {
    // Repository errors
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository '{path}' has uncommitted changes; commit or stash them before switching branches")]
    UncommittedChangesPresent { path: PathBuf },

    #[error("'{name}' is not a valid branch name")]
    InvalidBranchName { name: String },

    // Subprocess errors
    #[error("`{command}` failed with exit code {}: {stderr}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("Executable '{tool}' was not found in PATH")]
    ToolNotFound { tool: String },

    #[error("Could not parse output of `{command}`: {detail}")]
    UnexpectedOutput { command: String, detail: String },

    // Cache errors
    #[error("Cache is not usable: {reason}")]
    CacheInvalid { reason: String },

    #[error("Cache file '{path}' is corrupt: {source}")]
    CacheCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cache file does not exist at '{path}'")]
    CacheFileNotFound { path: PathBuf },

    #[error("Could not find cache directory")]
    CacheDirectoryNotFound,

    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Path is already monitored: {path}")]
    RootAlreadyMonitored { path: PathBuf },

    #[error("Path is not a monitored root: {path}")]
    RootNotMonitored { path: PathBuf },

    #[error("Monitored root must be an existing directory: {path}")]
    RootNotADirectory { path: PathBuf },

    // Generic errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Convenience type alias for Results using GitFleetError
pub type Result<T> = std::result::Result<T, GitFleetError>;

impl GitFleetError {
    /// Create a not-a-repository error
    pub fn not_a_repository(path: impl Into<PathBuf>) -> Self {
        Self::NotARepository { path: path.into() }
    }

    /// Create an uncommitted-changes error for a refused branch switch
    pub fn uncommitted_changes(path: impl Into<PathBuf>) -> Self {
        Self::UncommittedChangesPresent { path: path.into() }
    }

    /// Create a command failed error from a finished process
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a command timed out error
    pub fn command_timed_out(command: impl Into<String>, timeout: Duration) -> Self {
        Self::CommandTimedOut {
            command: command.into(),
            timeout,
        }
    }

    /// Create an invalid branch name error for a refused checkout
    pub fn invalid_branch_name(name: impl Into<String>) -> Self {
        Self::InvalidBranchName { name: name.into() }
    }

    /// Create a missing executable error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create an unparsable command output error
    pub fn unexpected_output(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedOutput {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Create a cache invalid error
    pub fn cache_invalid(reason: impl Into<String>) -> Self {
        Self::CacheInvalid {
            reason: reason.into(),
        }
    }

    /// Create a cache corrupt error
    pub fn cache_corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheCorrupt {
            path: path.into(),
            source,
        }
    }

    /// Create a cache file not found error
    pub fn cache_file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CacheFileNotFound { path: path.into() }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// True for errors the user can act on directly (shown without a stack of context)
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::NotARepository { .. }
                | Self::UncommittedChangesPresent { .. }
                | Self::InvalidBranchName { .. }
                | Self::RootAlreadyMonitored { .. }
                | Self::RootNotMonitored { .. }
                | Self::RootNotADirectory { .. }
        )
    }
}
