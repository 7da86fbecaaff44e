use crate::commands::context::{absolute_path, build_orchestrator};
use crate::core::{error::Result, format_snapshot, print_success, FleetConfig};
use std::path::PathBuf;

/// Check out `branch` in `repo`, refusing when the working tree is dirty
pub async fn execute_switch(repo: PathBuf, branch: String) -> Result<()> {
    let config = FleetConfig::load_or_create()?;
    let repo = absolute_path(repo);

    let orchestrator = build_orchestrator(&config)?;
    let cached = orchestrator.restore_cached().await?;
    let snapshot = orchestrator.switch_branch(&repo, &branch).await?;
    if cached {
        orchestrator.persist(true).await;
    }

    print_success(&format!(
        "Switched {} to {}",
        repo.display(),
        format_snapshot(&snapshot)
    ));
    Ok(())
}
