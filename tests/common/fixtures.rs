//! Predefined folder layouts and an isolated CLI environment

#![allow(dead_code)]

use super::repository::*;
use assert_cmd::prelude::*;
use git_fleet::core::error::{GitFleetError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A `code` folder laid out like a typical projects directory:
///
/// ```text
/// code/
///   app/            repository, one commit
///   clients/        workspace
///     ios/          repository, one commit
///     web/          repository, one commit
///   notes/          plain folder
/// ```
pub struct CodeTree {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl CodeTree {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

pub fn create_code_tree() -> Result<CodeTree> {
    let temp_dir = TempDir::new().map_err(GitFleetError::Io)?;
    let root = temp_dir
        .path()
        .canonicalize()
        .map_err(GitFleetError::Io)?
        .join("code");

    init_repo_with_commit(&root.join("app"))?;
    init_repo_with_commit(&root.join("clients/ios"))?;
    init_repo_with_commit(&root.join("clients/web"))?;
    fs::create_dir_all(root.join("notes")).map_err(GitFleetError::Io)?;

    Ok(CodeTree { temp_dir, root })
}

/// Config and cache homes private to one test
pub struct FleetEnv {
    pub config_home: TempDir,
    pub cache_home: TempDir,
}

impl FleetEnv {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_home: TempDir::new().map_err(GitFleetError::Io)?,
            cache_home: TempDir::new().map_err(GitFleetError::Io)?,
        })
    }

    /// The binary, pointed at this environment with colors off
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-fleet").expect("git-fleet binary is built");
        cmd.env("XDG_CONFIG_HOME", self.config_home.path())
            .env("XDG_CACHE_HOME", self.cache_home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_home.path().join("git-fleet").join("tree.json")
    }

    pub fn add_root(&self, root: &Path) {
        self.cmd().args(["roots", "add"]).arg(root).assert().success();
    }
}
