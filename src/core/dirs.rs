use crate::core::error::GitFleetError;
use std::path::PathBuf;

const APP_DIR: &str = "git-fleet";

pub fn get_config_directory() -> Result<PathBuf, GitFleetError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(GitFleetError::CacheDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR))
}

pub fn get_cache_directory() -> Result<PathBuf, GitFleetError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".cache")),
        "macos" => dirs::home_dir().unwrap_or_default().join("Library/Caches"),
        _ => dirs::cache_dir().ok_or(GitFleetError::CacheDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR))
}

/// Location of the persisted tree snapshot
pub fn get_cache_file() -> Result<PathBuf, GitFleetError> {
    Ok(get_cache_directory()?.join("tree.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_are_namespaced() {
        assert!(get_config_directory().unwrap().ends_with(APP_DIR));
        assert!(get_cache_file().unwrap().ends_with("git-fleet/tree.json"));
    }
}
