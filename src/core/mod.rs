//! Core building blocks for tagrelease
//!
//! - **config**: release.toml parsing and merging with command-line flags
//! - **env**: immutable environment snapshots for child processes
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod env;
pub mod error;
pub mod vcs;
