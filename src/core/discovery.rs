//! Repository and workspace discovery.
//!
//! [`Discoverer`] turns the monitored root paths into the tree skeleton: which
//! directories are repositories, which are workspaces grouping repositories, and
//! which are plain folders. It only looks at directory listings and `.git`
//! entries, never at git state.
//!
//! The walk is deliberately shallow, two levels below each root, which bounds
//! the cost on large home directories. Unreadable directories are logged and
//! treated as empty; one bad root never aborts the others.

use crate::core::state::{NodeKind, TreeNode};
use futures::future::join_all;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct Discoverer;

impl Discoverer {
    pub fn new() -> Self {
        Self
    }

    /// Walk every root concurrently on blocking threads
    pub async fn discover(
        &self,
        root_paths: &[PathBuf],
        ignored_paths: &HashSet<PathBuf>,
    ) -> Vec<TreeNode> {
        let walks = root_paths.iter().cloned().map(|root| {
            let ignored = ignored_paths.clone();
            tokio::task::spawn_blocking(move || discover_root(&root, &ignored))
        });

        let mut forest = Vec::new();
        for (root, outcome) in root_paths.iter().zip(join_all(walks).await) {
            match outcome {
                Ok(Some(node)) => forest.push(node),
                Ok(None) => log::debug!("Root {} is ignored", root.display()),
                Err(e) => log::error!("Discovery of {} panicked: {e}", root.display()),
            }
        }
        forest
    }
}

/// Classify one root. `None` when the root itself is ignored.
pub fn discover_root(root: &Path, ignored: &HashSet<PathBuf>) -> Option<TreeNode> {
    if ignored.contains(root) {
        return None;
    }

    if has_git_entry(root) {
        log::debug!("Root {} is itself a repository", root.display());
        return Some(TreeNode::new(root, NodeKind::Repository));
    }

    let children = visible_subdirectories(root, ignored)
        .into_iter()
        .map(|dir| classify_child(dir, ignored))
        .collect();

    Some(TreeNode::new(root, NodeKind::Root).with_children(children))
}

/// A first-level directory: repository, workspace of repositories, or plain folder
fn classify_child(dir: PathBuf, ignored: &HashSet<PathBuf>) -> TreeNode {
    if has_git_entry(&dir) {
        return TreeNode::new(dir, NodeKind::Repository);
    }

    let repositories: Vec<TreeNode> = visible_subdirectories(&dir, ignored)
        .into_iter()
        .filter(|sub| has_git_entry(sub))
        .map(|sub| TreeNode::new(sub, NodeKind::Repository))
        .collect();

    if repositories.is_empty() {
        TreeNode::new(dir, NodeKind::PlainFolder)
    } else {
        TreeNode::new(dir, NodeKind::Workspace).with_children(repositories)
    }
}

/// `.git` may be a directory or, for worktrees and submodules, a file
pub fn has_git_entry(dir: &Path) -> bool {
    dir.join(".git").symlink_metadata().is_ok()
}

/// Non-hidden, non-ignored directories directly under `dir`, sorted by name
fn visible_subdirectories(dir: &Path, ignored: &HashSet<PathBuf>) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .filter(|path| !ignored.contains(path))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}
