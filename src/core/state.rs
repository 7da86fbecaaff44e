//! Tree model and status snapshot data structures.
//!
//! This module defines the shapes shared by discovery, status fetching, the live
//! tree and the on-disk cache.
//!
//! # Public API
//! - [`TreeNode`]: One monitored directory with its classification and children
//! - [`NodeKind`]: Root / Workspace / Repository / PlainFolder
//! - [`StatusSnapshot`]: Immutable point-in-time git state of one repository
//! - [`BranchInfo`], [`CommitInfo`], [`RemoteHost`]: Snapshot building blocks
//! - [`CacheRecord`]: Persisted form of a whole scan
//!
//! # Ownership
//! The forest is an owned tree of owned children, so a node is only reachable
//! from one place. Snapshots are shared behind [`Arc`] and replaced wholesale,
//! never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A user-configured monitored path
    Root,
    /// A plain directory that contains at least one repository
    Workspace,
    /// A directory with a `.git` entry directly under it
    Repository,
    /// Neither a repository nor a workspace
    PlainFolder,
}

/// Remote hosting services recognized from `git remote -v` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteHost {
    GitHub,
    GitLab,
    Bitbucket,
    AzureDevOps,
}

impl RemoteHost {
    pub const ALL: [RemoteHost; 4] = [
        RemoteHost::GitHub,
        RemoteHost::GitLab,
        RemoteHost::Bitbucket,
        RemoteHost::AzureDevOps,
    ];

    /// Domain fragment searched for in remote URLs
    pub fn domain(&self) -> &'static str {
        match self {
            RemoteHost::GitHub => "github.com",
            RemoteHost::GitLab => "gitlab.com",
            RemoteHost::Bitbucket => "bitbucket.org",
            RemoteHost::AzureDevOps => "dev.azure.com",
        }
    }

    /// Whether the `gh` CLI can answer pull request queries for this host
    pub fn supports_pull_request_cli(&self) -> bool {
        matches!(self, RemoteHost::GitHub)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
    pub last_commit_hash: String,
    pub last_commit_date: Option<DateTime<Utc>>,
}

/// Point-in-time git state of a single repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub branch: String,
    pub has_uncommitted_changes: bool,
    pub untracked_files: Vec<String>,
    pub modified_files: Vec<String>,
    pub staged_files: Vec<String>,
    pub last_commit: Option<CommitInfo>,
    pub ahead: u32,
    pub behind: u32,
    pub pending_pull_requests: u32,
    pub remote_host: Option<RemoteHost>,
    pub branches: Vec<BranchInfo>,
}

impl StatusSnapshot {
    pub fn has_remote_host(&self) -> bool {
        self.remote_host.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub snapshot: Option<Arc<StatusSnapshot>>,
    #[serde(default)]
    pub last_observed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl TreeNode {
    pub fn new(path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            path,
            name,
            kind,
            children: Vec::new(),
            snapshot: None,
            last_observed: None,
            last_reviewed: None,
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_repository(&self) -> bool {
        self.kind == NodeKind::Repository
    }

    /// Replace the snapshot wholesale and stamp the observation time
    pub fn apply_snapshot(&mut self, snapshot: Arc<StatusSnapshot>, observed_at: DateTime<Utc>) {
        self.snapshot = Some(snapshot);
        self.last_observed = Some(observed_at);
    }
}

/// Last path component, or the whole path for roots like `/`
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Depth-first lookup of a node by path
pub fn find_node<'a>(nodes: &'a [TreeNode], path: &Path) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(&node.path) {
            if let Some(found) = find_node(&node.children, path) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_node_mut<'a>(nodes: &'a mut [TreeNode], path: &Path) -> Option<&'a mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(&node.path) {
            if let Some(found) = find_node_mut(&mut node.children, path) {
                return Some(found);
            }
        }
    }
    None
}

/// Remove the node at `path` (and its subtree). Returns whether anything was removed.
pub fn remove_node(nodes: &mut Vec<TreeNode>, path: &Path) -> bool {
    let before = nodes.len();
    nodes.retain(|node| node.path != path);
    if nodes.len() != before {
        return true;
    }
    nodes
        .iter_mut()
        .filter(|node| path.starts_with(&node.path))
        .any(|node| remove_node(&mut node.children, path))
}

/// All repository nodes in depth-first order
pub fn repositories(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    let mut found = Vec::new();
    collect_repositories(nodes, &mut found);
    found
}

fn collect_repositories<'a>(nodes: &'a [TreeNode], found: &mut Vec<&'a TreeNode>) {
    for node in nodes {
        if node.is_repository() {
            found.push(node);
        }
        collect_repositories(&node.children, found);
    }
}

/// Persisted form of one full scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    pub root_paths_fingerprint: String,
    pub timestamp: DateTime<Utc>,
    pub tree: Vec<TreeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forest() -> Vec<TreeNode> {
        vec![TreeNode::new("/code", NodeKind::Root).with_children(vec![
            TreeNode::new("/code/app", NodeKind::Repository),
            TreeNode::new("/code/clients", NodeKind::Workspace).with_children(vec![
                TreeNode::new("/code/clients/web", NodeKind::Repository),
                TreeNode::new("/code/clients/ios", NodeKind::Repository),
            ]),
            TreeNode::new("/code/notes", NodeKind::PlainFolder),
        ])]
    }

    #[test]
    fn test_node_name_from_path() {
        assert_eq!(TreeNode::new("/code/app", NodeKind::Repository).name, "app");
        assert_eq!(TreeNode::new("/", NodeKind::Root).name, "/");
    }

    #[test]
    fn test_find_nested_node() {
        let forest = sample_forest();
        let node = find_node(&forest, Path::new("/code/clients/ios")).unwrap();
        assert_eq!(node.kind, NodeKind::Repository);
        assert!(find_node(&forest, Path::new("/code/missing")).is_none());
    }

    #[test]
    fn test_repositories_lists_every_depth() {
        let forest = sample_forest();
        let names: Vec<_> = repositories(&forest).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["app", "web", "ios"]);
    }

    #[test]
    fn test_remove_nested_node() {
        let mut forest = sample_forest();
        assert!(remove_node(&mut forest, Path::new("/code/clients/web")));
        assert!(find_node(&forest, Path::new("/code/clients/web")).is_none());
        assert!(find_node(&forest, Path::new("/code/clients/ios")).is_some());
        assert!(!remove_node(&mut forest, Path::new("/code/clients/web")));
    }

    #[test]
    fn test_apply_snapshot_replaces_wholesale() {
        let mut forest = sample_forest();
        let now = Utc::now();
        let node = find_node_mut(&mut forest, Path::new("/code/app")).unwrap();
        node.apply_snapshot(
            Arc::new(StatusSnapshot {
                branch: "main".to_string(),
                untracked_files: vec!["a.txt".to_string()],
                ..Default::default()
            }),
            now,
        );
        node.apply_snapshot(
            Arc::new(StatusSnapshot {
                branch: "dev".to_string(),
                ..Default::default()
            }),
            now,
        );

        let snapshot = node.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.branch, "dev");
        assert!(snapshot.untracked_files.is_empty());
        assert_eq!(node.last_observed, Some(now));
    }

    #[test]
    fn test_remote_host_capabilities() {
        assert!(RemoteHost::GitHub.supports_pull_request_cli());
        assert!(!RemoteHost::GitLab.supports_pull_request_cli());
        assert!(StatusSnapshot {
            remote_host: Some(RemoteHost::Bitbucket),
            ..Default::default()
        }
        .has_remote_host());
    }
}
