//! Unified output formatting for the git-fleet CLI.
//!
//! Message helpers keep the same shape everywhere: red for errors, green for
//! success, blue for names, bright_black for secondary detail. The tree renderer
//! returns a `String` so commands and tests can share it.

use crate::core::state::{NodeKind, StatusSnapshot, TreeNode};
use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a success message
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Render the discovered forest, one line per node, children indented.
///
/// # Format
/// ```text
/// /home/me/code
///   clients/
///     web [main] ● (+2/−1) 3 PRs
///   notes/
/// ```
pub fn render_tree(forest: &[TreeNode]) -> String {
    let mut out = String::new();
    for root in forest {
        render_node(root, 0, &mut out);
    }
    out
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let label = match (depth, node.kind) {
        (0, _) => node.path.display().to_string().white().bold().to_string(),
        (_, NodeKind::Repository) => node.name.blue().to_string(),
        (_, NodeKind::Workspace) => format!("{}/", node.name).white().to_string(),
        (_, _) => format!("{}/", node.name).bright_black().to_string(),
    };

    let detail = match (node.kind, &node.snapshot) {
        (NodeKind::Repository, Some(snapshot)) => format!(" {}", format_snapshot(snapshot)),
        (NodeKind::Repository, None) => format!(" {}", "…".bright_black()),
        _ => String::new(),
    };

    out.push_str(&format!("{indent}{label}{detail}\n"));
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

/// One-line summary: branch, dirty marker, ahead/behind and open pull requests
pub fn format_snapshot(snapshot: &StatusSnapshot) -> String {
    let mut parts = vec![format!(
        "{}{}{}",
        "[".bright_black(),
        snapshot.branch.green(),
        "]".bright_black()
    )];

    if snapshot.has_uncommitted_changes {
        parts.push("●".yellow().to_string());
    }

    let ahead_behind = format_ahead_behind(snapshot.ahead, snapshot.behind);
    if !ahead_behind.is_empty() {
        parts.push(ahead_behind);
    }

    match snapshot.pending_pull_requests {
        0 => {}
        1 => parts.push("1 PR".magenta().to_string()),
        n => parts.push(format!("{n} PRs").magenta().to_string()),
    }

    parts.join(" ")
}

fn format_ahead_behind(ahead: u32, behind: u32) -> String {
    let inner = match (ahead, behind) {
        (0, 0) => return String::new(),
        (a, 0) => format!("+{}", a.to_string().white()),
        (0, b) => format!("−{}", b.to_string().white()),
        (a, b) => format!("+{}/−{}", a.to_string().white(), b.to_string().white()),
    };
    format!("{}{}{}", "(".bright_black(), inner, ")".bright_black())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_print_helpers_do_not_panic() {
        print_error("Test error message");
        print_success("Operation completed");
        print_info("Information message");
        print_section_header("Roots");
    }

    #[test]
    fn test_format_snapshot() {
        plain();
        let snapshot = StatusSnapshot {
            branch: "main".to_string(),
            has_uncommitted_changes: true,
            ahead: 2,
            behind: 1,
            pending_pull_requests: 3,
            ..Default::default()
        };
        assert_eq!(format_snapshot(&snapshot), "[main] ● (+2/−1) 3 PRs");

        let clean = StatusSnapshot {
            branch: "dev".to_string(),
            behind: 4,
            ..Default::default()
        };
        assert_eq!(format_snapshot(&clean), "[dev] (−4)");
    }

    #[test]
    fn test_render_tree_indents_children() {
        plain();
        let mut web = TreeNode::new("/code/clients/web", NodeKind::Repository);
        web.snapshot = Some(Arc::new(StatusSnapshot {
            branch: "main".to_string(),
            ..Default::default()
        }));
        let forest = vec![TreeNode::new("/code", NodeKind::Root).with_children(vec![
            TreeNode::new("/code/clients", NodeKind::Workspace).with_children(vec![web]),
            TreeNode::new("/code/notes", NodeKind::PlainFolder),
            TreeNode::new("/code/fresh", NodeKind::Repository),
        ])];

        assert_eq!(
            render_tree(&forest),
            "/code\n  clients/\n    web [main]\n  notes/\n  fresh …\n"
        );
    }
}
