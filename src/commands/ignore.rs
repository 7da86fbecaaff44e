use crate::commands::context::{absolute_path, build_orchestrator};
use crate::core::{error::Result, print_info, print_success, FleetConfig};
use std::path::PathBuf;

/// Exclude a path from discovery and drop it from the cached tree
pub async fn execute_ignore(path: PathBuf) -> Result<()> {
    let mut config = FleetConfig::load_or_create()?;
    let path = absolute_path(path);

    if !config.ignore_path(path.clone()) {
        print_info(&format!("{} is already ignored", path.display()));
        return Ok(());
    }
    config.save()?;

    let orchestrator = build_orchestrator(&config)?;
    if orchestrator.restore_cached().await? && orchestrator.ignore_path(path.clone()) {
        orchestrator.persist(true).await;
    }

    print_success(&format!("Ignoring {}", path.display()));
    Ok(())
}
