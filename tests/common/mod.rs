//! Shared test utilities for git-fleet integration tests
//!
//! Everything here works against real git repositories in temporary
//! directories, with config and cache redirected away from the user's home.

pub mod assertions;
pub mod fixtures;
pub mod repository;
