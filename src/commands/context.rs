//! Wiring shared by the subcommands: config, cache location and the orchestrator.

use crate::core::{
    dirs::get_cache_file, error::Result, CacheStore, Discoverer, FetchSettings, FleetConfig,
    ScanOrchestrator, ScanSettings, StalenessDetector, StatusFetcher, TokioProcessRunner,
    ToolPaths,
};
use std::path::PathBuf;
use std::sync::Arc;

pub type FleetOrchestrator = ScanOrchestrator<TokioProcessRunner>;

/// Assemble the production orchestrator from the persisted configuration
pub fn build_orchestrator(config: &FleetConfig) -> Result<Arc<FleetOrchestrator>> {
    Ok(build_orchestrator_with_cache(config, get_cache_file()?))
}

pub fn build_orchestrator_with_cache(
    config: &FleetConfig,
    cache_file: PathBuf,
) -> Arc<FleetOrchestrator> {
    let tuning = &config.scan;
    let fetcher = StatusFetcher::new(
        Arc::new(TokioProcessRunner),
        ToolPaths::detect().clone(),
        FetchSettings {
            command_timeout: tuning.command_timeout(),
            open_pr_states: tuning.open_pr_states.clone(),
        },
    );
    let cache = CacheStore::new(cache_file, tuning.min_cache_write_interval());
    let settings = ScanSettings {
        root_paths: config.root_paths.clone(),
        ignored_paths: config.ignored_paths.iter().cloned().collect(),
        cache_max_age: tuning.cache_max_age(),
        batch_floor: tuning.batch_floor,
    };

    Arc::new(ScanOrchestrator::new(
        Discoverer::new(),
        fetcher,
        StalenessDetector::new(),
        Arc::new(cache),
        settings,
    ))
}

/// Absolute form of a user-supplied path; falls back to the input when it does not exist
pub fn absolute_path(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}
