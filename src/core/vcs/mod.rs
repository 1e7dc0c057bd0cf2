pub mod system_git;
mod system_git_ops;

use crate::core::error::ReleaseResult;
use std::path::Path;

pub use system_git::SystemGit;

/// Version-control operations a release needs
///
/// Kept as a trait so the orchestrator can be driven by a recording fake in
/// tests and by [`SystemGit`] in production.
pub trait Vcs {
  /// Get the repository root path
  fn root(&self) -> &Path;

  /// True when tracked files differ from HEAD (untracked files are ignored)
  fn has_uncommitted_changes(&self) -> ReleaseResult<bool>;

  /// Create a tag at HEAD; annotated when `message` is given
  fn create_tag(&self, tag: &str, message: Option<&str>) -> ReleaseResult<()>;

  /// Push a single tag to a remote
  fn push_tag(&self, remote: &str, tag: &str) -> ReleaseResult<()>;
}
