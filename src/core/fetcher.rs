//! Per-repository status aggregation.
//!
//! [`StatusFetcher`] assembles a [`StatusSnapshot`] from a set of independent
//! `git` (and optionally `gh`) invocations issued concurrently. Every facet is
//! isolated: a failing or hanging subcommand only costs its own field, which
//! falls back to the previous snapshot's value or an empty default. A fetch as a
//! whole therefore never fails.
//!
//! # Modes
//! - [`FetchMode::Full`]: every facet, used by full scans and first sightings
//! - [`FetchMode::Light`]: branch, dirty flag and last commit only; everything
//!   else is carried over from the previous snapshot
//!
//! Branch switching lives here as well because it shares the command plumbing
//! and the dirty check.

use crate::core::error::{GitFleetError, Result};
use crate::core::parse;
use crate::core::process::{ProcessRunner, ToolPaths};
use crate::core::state::{BranchInfo, CommitInfo, RemoteHost, StatusSnapshot};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const BRANCH_FORMAT: &str =
    "--format=%(refname:short)|%(objectname:short)|%(committerdate:iso8601)|%(HEAD)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    Full,
    Light,
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub command_timeout: Duration,
    pub open_pr_states: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(15),
            open_pr_states: vec!["open".to_string()],
        }
    }
}

pub struct StatusFetcher<R> {
    runner: Arc<R>,
    tools: ToolPaths,
    settings: FetchSettings,
}

impl<R: ProcessRunner> StatusFetcher<R> {
    pub fn new(runner: Arc<R>, tools: ToolPaths, settings: FetchSettings) -> Self {
        Self {
            runner,
            tools,
            settings,
        }
    }

    pub async fn fetch(
        &self,
        repo: &Path,
        mode: FetchMode,
        previous: Option<&StatusSnapshot>,
    ) -> StatusSnapshot {
        log::debug!("Fetching {:?} status for {}", mode, repo.display());
        match mode {
            FetchMode::Full => self.fetch_full(repo, previous).await,
            FetchMode::Light => self.fetch_light(repo, previous).await,
        }
    }

    async fn fetch_full(&self, repo: &Path, previous: Option<&StatusSnapshot>) -> StatusSnapshot {
        let (branch, dirty, untracked, modified, staged, commit, ahead_behind, branches, remote) = tokio::join!(
            self.current_branch(repo),
            self.is_dirty(repo),
            self.file_list(repo, &["ls-files", "--others", "--exclude-standard"]),
            self.file_list(repo, &["diff", "--name-only"]),
            self.file_list(repo, &["diff", "--cached", "--name-only"]),
            self.last_commit(repo),
            self.ahead_behind(repo),
            self.branches(repo),
            self.remote_and_pull_requests(repo, previous),
        );
        let (remote_host, pending_pull_requests) = remote;
        let (ahead, behind) = settle(
            repo,
            "ahead/behind",
            ahead_behind,
            previous.map(|p| (p.ahead, p.behind)),
        );

        StatusSnapshot {
            branch: settle(repo, "branch", branch, previous.map(|p| p.branch.clone())),
            has_uncommitted_changes: settle(
                repo,
                "dirty check",
                dirty,
                previous.map(|p| p.has_uncommitted_changes),
            ),
            untracked_files: settle(
                repo,
                "untracked files",
                untracked,
                previous.map(|p| p.untracked_files.clone()),
            ),
            modified_files: settle(
                repo,
                "modified files",
                modified,
                previous.map(|p| p.modified_files.clone()),
            ),
            staged_files: settle(
                repo,
                "staged files",
                staged,
                previous.map(|p| p.staged_files.clone()),
            ),
            last_commit: settle(
                repo,
                "last commit",
                commit.map(Some),
                previous.map(|p| p.last_commit.clone()),
            ),
            ahead,
            behind,
            pending_pull_requests,
            remote_host: settle(
                repo,
                "remote",
                remote_host,
                previous.map(|p| p.remote_host),
            ),
            branches: settle(
                repo,
                "branch list",
                branches,
                previous.map(|p| p.branches.clone()),
            ),
        }
    }

    async fn fetch_light(&self, repo: &Path, previous: Option<&StatusSnapshot>) -> StatusSnapshot {
        let (branch, dirty, commit) = tokio::join!(
            self.current_branch(repo),
            self.is_dirty(repo),
            self.last_commit(repo),
        );

        let carried = previous.cloned().unwrap_or_default();
        StatusSnapshot {
            branch: settle(repo, "branch", branch, previous.map(|p| p.branch.clone())),
            has_uncommitted_changes: settle(
                repo,
                "dirty check",
                dirty,
                previous.map(|p| p.has_uncommitted_changes),
            ),
            last_commit: settle(
                repo,
                "last commit",
                commit.map(Some),
                previous.map(|p| p.last_commit.clone()),
            ),
            ..carried
        }
    }

    /// Check out `branch`, refusing when the working tree has uncommitted changes
    pub async fn switch_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        if !is_checkout_target(branch) {
            return Err(GitFleetError::invalid_branch_name(branch));
        }
        if !repo.join(".git").exists() {
            return Err(GitFleetError::not_a_repository(repo));
        }
        if self.is_dirty(repo).await? {
            log::info!("Refusing to switch {} to '{branch}': uncommitted changes", repo.display());
            return Err(GitFleetError::uncommitted_changes(repo));
        }
        self.git(repo, &["checkout", branch]).await?;
        log::info!("Switched {} to '{branch}'", repo.display());
        Ok(())
    }

    async fn current_branch(&self, repo: &Path) -> Result<String> {
        let stdout = self.git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        parse::parse_branch_name(&stdout)
    }

    async fn is_dirty(&self, repo: &Path) -> Result<bool> {
        let stdout = self.git(repo, &["status", "--porcelain"]).await?;
        Ok(parse::parse_dirty(&stdout))
    }

    async fn file_list(&self, repo: &Path, args: &[&str]) -> Result<Vec<String>> {
        let stdout = self.git(repo, args).await?;
        Ok(parse::parse_lines(&stdout))
    }

    async fn last_commit(&self, repo: &Path) -> Result<CommitInfo> {
        let (hash, log) = tokio::join!(
            self.git(repo, &["rev-parse", "HEAD"]),
            self.git(
                repo,
                &["log", "-1", "--pretty=%s|%cd", "--date=iso-strict"]
            ),
        );
        parse::parse_last_commit(&hash?, &log?)
    }

    /// Counts against the upstream; a branch without one is simply level
    async fn ahead_behind(&self, repo: &Path) -> Result<(u32, u32)> {
        let result = self
            .git(
                repo,
                &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"],
            )
            .await;
        match result {
            Ok(stdout) => parse::parse_ahead_behind(&stdout),
            Err(GitFleetError::CommandFailed { ref stderr, .. }) if lacks_upstream(stderr) => {
                Ok((0, 0))
            }
            Err(e) => Err(e),
        }
    }

    async fn branches(&self, repo: &Path) -> Result<Vec<BranchInfo>> {
        let stdout = self
            .git(
                repo,
                &["branch", "-v", "--sort=-committerdate", BRANCH_FORMAT],
            )
            .await?;
        Ok(parse::parse_branches(&stdout))
    }

    /// Host classification, then the PR count only for hosts `gh` can answer for
    async fn remote_and_pull_requests(
        &self,
        repo: &Path,
        previous: Option<&StatusSnapshot>,
    ) -> (Result<Option<RemoteHost>>, u32) {
        let host = match self.git(repo, &["remote", "-v"]).await {
            Ok(stdout) => parse::classify_remote(&stdout),
            Err(e) => return (Err(e), previous.map_or(0, |p| p.pending_pull_requests)),
        };

        let prs = match host {
            Some(host) if host.supports_pull_request_cli() => {
                self.pending_pull_requests(repo, previous).await
            }
            _ => 0,
        };
        (Ok(host), prs)
    }

    async fn pending_pull_requests(&self, repo: &Path, previous: Option<&StatusSnapshot>) -> u32 {
        let Some(gh) = self.tools.gh.as_deref() else {
            log::debug!("gh not installed, pull request count unavailable");
            return 0;
        };
        let result = self
            .run_tool(
                gh,
                &["pr", "list", "--state", "open", "--json", "state", "--limit", "200"],
                repo,
            )
            .await
            .and_then(|stdout| parse::count_open_pull_requests(&stdout, &self.settings.open_pr_states));
        settle(
            repo,
            "pull requests",
            result,
            previous.map(|p| p.pending_pull_requests),
        )
    }

    async fn git(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let git = self
            .tools
            .git
            .as_deref()
            .ok_or_else(|| GitFleetError::tool_not_found("git"))?;
        self.run_tool(git, args, repo).await
    }

    /// Run one subcommand under the configured time-out; stdout on success
    async fn run_tool(&self, executable: &Path, args: &[&str], dir: &Path) -> Result<String> {
        let describe = || {
            let tool = executable
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{} {}", tool, args.join(" "))
        };

        let output = tokio::time::timeout(
            self.settings.command_timeout,
            self.runner.run(executable, args, dir),
        )
        .await
        .map_err(|_| GitFleetError::command_timed_out(describe(), self.settings.command_timeout))??;

        if output.is_success() {
            Ok(output.stdout)
        } else {
            Err(GitFleetError::command_failed(
                describe(),
                output.exit_code,
                output.stderr.trim(),
            ))
        }
    }
}

/// git's answer for a branch with no tracking branch, or no branch at all
fn lacks_upstream(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("no upstream configured") || stderr.contains("does not point to a branch")
}

/// Rejects names git would parse as an option or could never resolve as a ref
fn is_checkout_target(branch: &str) -> bool {
    !branch.is_empty()
        && !branch.starts_with('-')
        && !branch
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Resolve one facet: the fresh value, else the previous one, else the default
fn settle<T: Default>(repo: &Path, facet: &str, fresh: Result<T>, previous: Option<T>) -> T {
    match fresh {
        Ok(value) => value,
        Err(e) => {
            log::debug!("{}: {facet} unavailable: {e}", repo.display());
            previous.unwrap_or_default()
        }
    }
}
