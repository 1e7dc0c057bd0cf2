//! Release workflow: version resolution, tagging, and publishing
//!
//! - **descriptor**: version lookup inside XML project descriptors
//! - **version**: `VersionSource` trait with literal and descriptor sources
//! - **publish**: the external build/publish command
//! - **orchestrator**: runs the steps in order and stops at the first failure

pub mod descriptor;
pub mod orchestrator;
pub mod publish;
pub mod version;

pub use orchestrator::{Orchestrator, ReleaseOutcome, ReleasePlan};
