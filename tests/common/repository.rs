//! Git repository setup utilities
//!
//! Thin wrappers over the `git` CLI used to put test repositories into a
//! known state before the scanner looks at them.

#![allow(dead_code)]

use git_fleet::core::error::{GitFleetError, Result};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Run git in `repo_path`, failing the helper when git exits non-zero
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(GitFleetError::Io)?;
    if !output.status.success() {
        return Err(GitFleetError::command_failed(
            format!("git {}", args.join(" ")),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Initialise a repository on branch `main` with a local identity
pub fn init_repo(repo_path: &Path) -> Result<()> {
    fs::create_dir_all(repo_path).map_err(GitFleetError::Io)?;
    git(repo_path, &["init", "--quiet"])?;
    git(repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(repo_path, &["config", "user.name", "Test User"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Repository with one commit containing `README.md`
pub fn init_repo_with_commit(repo_path: &Path) -> Result<()> {
    init_repo(repo_path)?;
    create_file(repo_path, "README.md", "# test\n")?;
    git_add(repo_path, "README.md")?;
    git_commit(repo_path, "Initial commit")
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    fs::write(repo_path.join(filename), content).map_err(GitFleetError::Io)
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", filename]).map(|_| ())
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "--quiet", "-m", message]).map(|_| ())
}

/// Create `branch` at HEAD without switching to it
pub fn git_branch(repo_path: &Path, branch: &str) -> Result<()> {
    git(repo_path, &["branch", branch]).map(|_| ())
}

/// Push `main` to a fresh bare repository at `origin` and track it
pub fn add_bare_origin(repo_path: &Path, origin: &Path) -> Result<()> {
    let parent = origin.parent().unwrap_or(repo_path);
    let origin_arg = origin.to_string_lossy();
    git(parent, &["init", "--quiet", "--bare", origin_arg.as_ref()])?;
    git(repo_path, &["remote", "add", "origin", origin_arg.as_ref()])?;
    git(repo_path, &["push", "--quiet", "-u", "origin", "main"]).map(|_| ())
}

pub fn current_branch(repo_path: &Path) -> Result<String> {
    Ok(git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string())
}
