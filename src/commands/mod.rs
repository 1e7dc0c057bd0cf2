//! CLI commands for tagrelease
//!
//! - **release**: check the tree, resolve the version, tag, push, and publish

pub mod release;

pub use release::run_release;
