use crate::commands::context::absolute_path;
use crate::core::{error::Result, print_info, print_section_header, print_success, FleetConfig};
use colored::*;
use std::path::PathBuf;

pub fn execute_roots_list() -> Result<()> {
    let config = FleetConfig::load_or_create()?;

    if config.root_paths.is_empty() {
        print_info("No root paths monitored. Add one with: git-fleet roots add <path>");
        return Ok(());
    }

    print_section_header("Monitored roots");
    for root in &config.root_paths {
        println!("  {}", root.display().to_string().blue());
    }

    if !config.ignored_paths.is_empty() {
        print_section_header("Ignored");
        for path in &config.ignored_paths {
            println!("  {}", path.display().to_string().bright_black());
        }
    }
    println!();
    Ok(())
}

pub fn execute_roots_add(path: PathBuf) -> Result<()> {
    let mut config = FleetConfig::load_or_create()?;
    let path = absolute_path(path);
    config.add_root(path.clone())?;
    config.save()?;
    log::info!("Added root {}", path.display());
    print_success(&format!("Monitoring {}", path.display()));
    Ok(())
}

/// The cached tree is invalidated by the root set change, so nothing else to evict
pub fn execute_roots_remove(path: PathBuf) -> Result<()> {
    let mut config = FleetConfig::load_or_create()?;
    let path = absolute_path(path);
    config.remove_root(&path)?;
    config.save()?;
    log::info!("Removed root {}", path.display());
    print_success(&format!("No longer monitoring {}", path.display()));
    Ok(())
}
