//! git-fleet - keep an eye on every git working tree under a set of root folders.
//!
//! The library discovers repositories and workspaces below monitored roots,
//! collects a status snapshot per repository through the `git` and `gh` CLIs,
//! and caches the whole tree so the next start shows results immediately.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - [`ScanOrchestrator`] for startup, full scans and light refreshes
//! - [`Discoverer`], [`StatusFetcher`], [`StalenessDetector`], [`CacheStore`]
//! - The tree model ([`TreeNode`], [`StatusSnapshot`]) and error types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Scan components
    CacheStore,
    CacheWrite,
    Discoverer,
    FetchMode,
    FetchSettings,
    // Configuration
    FleetConfig,
    // Error handling
    GitFleetError,
    NodeKind,
    ProcessOutput,
    // External processes
    ProcessRunner,
    Result,
    // Orchestration
    ScanOrchestrator,
    ScanReport,
    ScanSettings,
    ScanState,
    StalenessDetector,
    StartupOutcome,
    StatusFetcher,
    StatusSnapshot,
    TokioProcessRunner,
    ToolPaths,
    // Tree model
    TreeNode,
};
