use crate::commands::context::{build_orchestrator, FleetOrchestrator};
use crate::core::{
    error::Result, print_info, print_section_header, print_success, render_tree, CacheWrite,
    FleetConfig, ScanReport, StartupOutcome,
};

const NO_ROOTS_HINT: &str = "No root paths monitored. Add one with: git-fleet roots add <path>";

/// Rediscover every root and fetch every repository from scratch
pub async fn execute_scan() -> Result<()> {
    let config = FleetConfig::load_or_create()?;
    if config.root_paths.is_empty() {
        print_info(NO_ROOTS_HINT);
        return Ok(());
    }

    let orchestrator = build_orchestrator(&config)?;
    let report = orchestrator.full_scan().await?;
    show(&orchestrator, &report);
    Ok(())
}

/// Start from the cache when it is usable and only refetch what changed
pub async fn execute_refresh() -> Result<()> {
    let config = FleetConfig::load_or_create()?;
    if config.root_paths.is_empty() {
        print_info(NO_ROOTS_HINT);
        return Ok(());
    }

    let orchestrator = build_orchestrator(&config)?;
    let report = match orchestrator.startup().await? {
        StartupOutcome::FromCache(refresh) => refresh.await??,
        StartupOutcome::FullScan(report) => report,
    };
    show(&orchestrator, &report);
    Ok(())
}

fn show(orchestrator: &FleetOrchestrator, report: &ScanReport) {
    print_section_header("Repositories");
    print!("{}", render_tree(&orchestrator.tree()));
    print_success(&summary(report));
}

fn summary(report: &ScanReport) -> String {
    let fetched = report.full_fetches + report.light_fetches;
    let mut line = format!(
        "{} repositories, {} fetched, {} unchanged",
        report.repositories, fetched, report.skipped_fresh
    );
    if report.cache == CacheWrite::Failed {
        line.push_str(" (cache not saved)");
    }
    line
}
