//! Parsers for the text output of the git and gh subcommands the fetcher runs.
//!
//! Every function here is pure: it takes captured stdout and returns typed data,
//! so the interpretation rules are testable without spawning anything.

use crate::core::error::{GitFleetError, Result};
use crate::core::state::{BranchInfo, CommitInfo, RemoteHost};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Non-empty, trimmed lines (file lists, porcelain output)
pub fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `rev-parse --abbrev-ref HEAD`; a detached head prints the literal `HEAD`
pub fn parse_branch_name(stdout: &str) -> Result<String> {
    let name = stdout.trim();
    if name.is_empty() {
        return Err(GitFleetError::unexpected_output(
            "rev-parse --abbrev-ref HEAD",
            "empty branch name",
        ));
    }
    Ok(name.to_string())
}

/// `status --porcelain`: any output line means uncommitted work
pub fn parse_dirty(stdout: &str) -> bool {
    stdout.lines().any(|line| !line.trim().is_empty())
}

/// Combine `rev-parse HEAD` with `log -1 --pretty=%s|%cd --date=iso-strict`.
///
/// The subject may itself contain `|`, so the date is split off from the right.
pub fn parse_last_commit(hash_stdout: &str, log_stdout: &str) -> Result<CommitInfo> {
    let hash = hash_stdout.trim();
    if hash.is_empty() {
        return Err(GitFleetError::unexpected_output("rev-parse HEAD", "empty hash"));
    }

    let line = log_stdout.lines().next().unwrap_or("").trim_end();
    let (message, date) = match line.rsplit_once('|') {
        Some((message, raw_date)) => (message.to_string(), parse_iso_strict(raw_date)),
        None => (line.to_string(), None),
    };

    Ok(CommitInfo {
        hash: hash.to_string(),
        message,
        date,
    })
}

fn parse_iso_strict(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `%(committerdate:iso8601)` renders as `2024-05-01 12:00:00 +0200`
fn parse_iso8601_git(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `rev-list --left-right --count HEAD...@{upstream}` prints `<ahead>\t<behind>`
pub fn parse_ahead_behind(stdout: &str) -> Result<(u32, u32)> {
    let mut counts = stdout.split_whitespace().map(str::parse::<u32>);
    match (counts.next(), counts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind))) => Ok((ahead, behind)),
        _ => Err(GitFleetError::unexpected_output(
            "rev-list --left-right --count",
            format!("expected two counts, got '{}'", stdout.trim()),
        )),
    }
}

/// Lines of `name|short-hash|committer-date|HEAD-marker`, newest commit first.
///
/// Ordering is re-established here rather than trusted from git: most recent
/// commit time descending, stable for equal times, undated branches last.
pub fn parse_branches(stdout: &str) -> Vec<BranchInfo> {
    let mut branches: Vec<BranchInfo> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(4, '|');
            let name = fields.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let hash = fields.next().unwrap_or("").trim();
            let date = fields.next().and_then(parse_iso8601_git);
            let is_current = fields.next().map(|m| m.trim() == "*").unwrap_or(false);
            Some(BranchInfo {
                name: name.to_string(),
                is_current,
                last_commit_hash: hash.to_string(),
                last_commit_date: date,
            })
        })
        .collect();

    branches.sort_by(|a, b| b.last_commit_date.cmp(&a.last_commit_date));
    branches
}

/// First known hosting domain mentioned by `remote -v`
pub fn classify_remote(stdout: &str) -> Option<RemoteHost> {
    stdout.lines().find_map(|line| {
        let url = line.split_whitespace().nth(1)?.to_ascii_lowercase();
        RemoteHost::ALL
            .into_iter()
            .find(|host| url.contains(host.domain()))
    })
}

#[derive(Debug, Deserialize)]
struct PullRequestEntry {
    #[serde(default)]
    state: String,
}

/// Count entries of `gh pr list --json state` whose state matches an open token
pub fn count_open_pull_requests(stdout: &str, open_states: &[String]) -> Result<u32> {
    let entries: Vec<PullRequestEntry> = serde_json::from_str(stdout.trim())?;
    let open = entries
        .iter()
        .filter(|entry| {
            open_states
                .iter()
                .any(|token| entry.state.eq_ignore_ascii_case(token))
        })
        .count();
    Ok(u32::try_from(open).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_lines_skips_blank() {
        assert_eq!(
            parse_lines("src/main.rs\n\nREADME.md\n"),
            vec!["src/main.rs".to_string(), "README.md".to_string()]
        );
        assert!(parse_lines("").is_empty());
    }

    #[test]
    fn test_parse_branch_name() {
        assert_eq!(parse_branch_name("main\n").unwrap(), "main");
        assert_eq!(parse_branch_name("HEAD\n").unwrap(), "HEAD");
        assert!(parse_branch_name("  \n").is_err());
    }

    #[test]
    fn test_parse_dirty() {
        assert!(parse_dirty(" M src/lib.rs\n?? new.txt\n"));
        assert!(!parse_dirty(""));
        assert!(!parse_dirty("\n"));
    }

    #[test]
    fn test_parse_last_commit_with_pipe_in_subject() {
        let commit = parse_last_commit(
            "0123456789abcdef\n",
            "Fix a|b parsing|2024-05-01T12:00:00+02:00\n",
        )
        .unwrap();
        assert_eq!(commit.hash, "0123456789abcdef");
        assert_eq!(commit.message, "Fix a|b parsing");
        assert_eq!(
            commit.date.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_last_commit_requires_hash() {
        assert!(parse_last_commit("", "msg|2024-05-01T12:00:00Z").is_err());
    }

    #[test]
    fn test_parse_ahead_behind() {
        assert_eq!(parse_ahead_behind("3\t1\n").unwrap(), (3, 1));
        assert_eq!(parse_ahead_behind("0 0").unwrap(), (0, 0));
        assert!(parse_ahead_behind("fatal").is_err());
    }

    #[test]
    fn test_parse_branches_orders_by_recent_commit() {
        let output = "\
old|aaaaaaa|2023-01-01 10:00:00 +0000|
main|bbbbbbb|2024-06-01 10:00:00 +0000|*
feature|ccccccc|2024-06-02 09:00:00 +0200|
broken|ddddddd|not a date|
";
        let branches = parse_branches(output);
        let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["feature", "main", "old", "broken"]);
        assert!(!branches[0].is_current);
        assert!(branches[1].is_current);
        assert_eq!(branches[1].last_commit_hash, "bbbbbbb");
        assert!(branches[3].last_commit_date.is_none());
    }

    #[test]
    fn test_classify_remote() {
        let output = "origin\tgit@github.com:acme/app.git (fetch)\norigin\tgit@github.com:acme/app.git (push)\n";
        assert_eq!(classify_remote(output), Some(RemoteHost::GitHub));
        assert_eq!(
            classify_remote("upstream\thttps://GitLab.com/acme/app.git (fetch)\n"),
            Some(RemoteHost::GitLab)
        );
        assert_eq!(
            classify_remote("origin\t/srv/git/app.git (fetch)\n"),
            None
        );
        assert_eq!(classify_remote(""), None);
    }

    #[test]
    fn test_count_open_pull_requests_case_insensitive() {
        let output = r#"[{"state":"OPEN"},{"state":"open"},{"state":"MERGED"},{"state":"CLOSED"}]"#;
        let tokens = vec!["open".to_string()];
        assert_eq!(count_open_pull_requests(output, &tokens).unwrap(), 2);
    }

    #[test]
    fn test_count_open_pull_requests_custom_tokens() {
        let output = r#"[{"state":"OPEN"},{"state":"DRAFT"},{}]"#;
        let tokens = vec!["open".to_string(), "draft".to_string()];
        assert_eq!(count_open_pull_requests(output, &tokens).unwrap(), 2);
        assert_eq!(count_open_pull_requests("[]", &tokens).unwrap(), 0);
        assert!(count_open_pull_requests("not json", &tokens).is_err());
    }
}
