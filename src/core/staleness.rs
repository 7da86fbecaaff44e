//! Cheap change detection for repositories.
//!
//! [`StalenessDetector`] decides from file modification times alone whether a
//! repository may have changed since its snapshot was taken. It never spawns a
//! process, which is what makes it affordable to run over every known repository
//! before deciding which ones deserve a `git` round trip.
//!
//! Observed paths inside the git directory:
//! - `index` (staging area writes, most working tree operations)
//! - `HEAD` (branch switches, detached checkouts)
//! - `refs/heads` (commits, new or deleted branches)
//!
//! Uncertainty resolves to "stale": an unreadable `index` or `HEAD` hides
//! nothing from the user at the cost of one extra fetch.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, Default)]
pub struct StalenessDetector;

impl StalenessDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_stale(&self, repo_path: &Path, last_observed: Option<DateTime<Utc>>) -> bool {
        let Some(last_observed) = last_observed else {
            log::debug!("{} never observed, treating as stale", repo_path.display());
            return true;
        };

        let git_dir = resolve_git_dir(repo_path);
        let (Some(index), Some(head)) = (
            modified_at(&git_dir.join("index")),
            modified_at(&git_dir.join("HEAD")),
        ) else {
            log::debug!(
                "{}: index or HEAD unreadable, assuming changed",
                repo_path.display()
            );
            return true;
        };
        let refs = modified_at(&git_dir.join("refs").join("heads"));

        let stale = [Some(index), Some(head), refs]
            .into_iter()
            .flatten()
            .any(|mtime| DateTime::<Utc>::from(mtime) > last_observed);

        if stale {
            log::debug!("{} changed since {}", repo_path.display(), last_observed);
        }
        stale
    }
}

/// The repository's git directory.
///
/// Linked worktrees and submodules carry a `.git` *file* of the form
/// `gitdir: <path>` instead of a directory; relative targets are resolved
/// against the repository path.
pub fn resolve_git_dir(repo_path: &Path) -> PathBuf {
    let dot_git = repo_path.join(".git");
    if dot_git.is_file() {
        if let Ok(content) = fs::read_to_string(&dot_git) {
            if let Some(target) = content.trim().strip_prefix("gitdir:") {
                let target = Path::new(target.trim());
                return if target.is_absolute() {
                    target.to_path_buf()
                } else {
                    repo_path.join(target)
                };
            }
        }
    }
    dot_git
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
