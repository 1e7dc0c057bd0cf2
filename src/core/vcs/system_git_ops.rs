//! Release operations for SystemGit (working tree status, tags, push)

use super::system_git::SystemGit;
use crate::core::error::{ReleaseError, ReleaseResult, VcsError};

impl SystemGit {
  /// Check tracked files against HEAD
  ///
  /// The index is refreshed first so files that were only touched (same
  /// content, new mtime) are not reported as modified.
  pub fn working_tree_dirty(&self) -> ReleaseResult<bool> {
    // Refresh failures surface through diff-index below
    let _ = self.run(&["update-index", "-q", "--refresh"])?;

    let output = self.run(&["diff-index", "--quiet", "HEAD", "--"])?;

    match output.status.code() {
      Some(0) => Ok(false),
      Some(1) => Ok(true),
      _ => Err(ReleaseError::VcsOperation(VcsError::StatusFailed {
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      })),
    }
  }

  /// Check if a local tag exists
  pub fn tag_exists(&self, tag: &str) -> ReleaseResult<bool> {
    let reference = format!("refs/tags/{}", tag);
    let output = self.run(&["rev-parse", "--verify", "--quiet", &reference])?;
    Ok(output.status.success())
  }

  /// Create a tag at HEAD
  pub fn tag(&self, tag: &str, message: Option<&str>) -> ReleaseResult<()> {
    if self.tag_exists(tag)? {
      return Err(ReleaseError::VcsOperation(VcsError::TagExists { tag: tag.to_string() }));
    }

    match message {
      Some(message) => self.run_checked(&["tag", "-a", tag, "-m", message])?,
      None => self.run_checked(&["tag", tag])?,
    };

    Ok(())
  }

  /// Push one tag to a remote
  pub fn push_tag_to_remote(&self, remote: &str, tag: &str) -> ReleaseResult<()> {
    let refspec = format!("refs/tags/{}", tag);
    let output = self.run(&["push", remote, &refspec])?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::VcsOperation(VcsError::PushFailed {
        remote: remote.to_string(),
        tag: tag.to_string(),
        reason: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }
}
