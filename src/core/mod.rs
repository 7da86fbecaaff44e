//! Core functionality for git-fleet.
//!
//! Discovery, staleness detection, status fetching, caching and the scan
//! orchestrator that ties them together, plus configuration and output helpers.

pub mod cache;
pub mod config;
pub mod dirs;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod output;
pub mod parse;
pub mod process;
pub mod staleness;
pub mod state;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{GitFleetError, Result};

// === Tree model ===
// Nodes, status snapshots and the persisted cache record
pub use state::{
    BranchInfo, CacheRecord, CommitInfo, NodeKind, RemoteHost, StatusSnapshot, TreeNode,
};

// === Configuration ===
pub use config::{FleetConfig, ScanTuning};

// === External processes ===
// Runner abstraction over git/gh invocations and tool lookup
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner, ToolPaths};

// === Scan components ===
pub use cache::{CacheStore, SaveOutcome};
pub use discovery::Discoverer;
pub use fetcher::{FetchMode, FetchSettings, StatusFetcher};
pub use staleness::StalenessDetector;

// === Orchestration ===
pub use orchestrator::{
    CacheWrite, ScanOrchestrator, ScanReport, ScanSettings, ScanState, StartupOutcome,
};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{
    format_snapshot, print_error, print_info, print_section_header, print_success, render_tree,
};
