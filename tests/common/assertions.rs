//! Predicates for git-fleet command output

#![allow(dead_code)]

use predicates::prelude::*;

pub fn no_roots_hint() -> impl Predicate<str> {
    predicates::str::contains("No root paths monitored")
}

pub fn error_line(message: &str) -> impl Predicate<str> {
    predicates::str::contains("✕ Error:").and(predicates::str::contains(message.to_string()))
}

/// A repository line in the rendered tree: name followed by its branch
pub fn has_repository(name: &str, branch: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{name} [{branch}]"))
}

pub fn has_folder(name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{name}/"))
}

pub fn has_summary(repositories: usize) -> impl Predicate<str> {
    predicates::str::contains(format!("{repositories} repositories"))
}
