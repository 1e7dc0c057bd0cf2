//! System git backend
//!
//! Every operation shells out to the `git` on PATH. Commands run with a
//! reduced environment so user-level git hooks into the environment (pager,
//! editor, alternate index) cannot change behavior, while credentials and
//! SSH agents still work for `push`.

use super::Vcs;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt, VcsError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables passed through to git
///
/// Covers credentials and SSH agents, HTTP proxies, GPG for signed tags,
/// desktop credential helpers, and the Windows profile directories.
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "USER",
  "XDG_CONFIG_HOME",
  "XDG_RUNTIME_DIR",
  "SSH_AUTH_SOCK",
  "GIT_SSH",
  "GIT_SSH_COMMAND",
  "GIT_ASKPASS",
  "SSH_ASKPASS",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "ALL_PROXY",
  "NO_PROXY",
  "http_proxy",
  "https_proxy",
  "all_proxy",
  "no_proxy",
  "GIT_SSL_CAINFO",
  "GIT_SSL_CAPATH",
  "SSL_CERT_FILE",
  "SSL_CERT_DIR",
  "GNUPGHOME",
  "GPG_TTY",
  "DISPLAY",
  "WAYLAND_DISPLAY",
  "DBUS_SESSION_BUS_ADDRESS",
  "SYSTEMROOT",
  "USERPROFILE",
  "APPDATA",
  "LOCALAPPDATA",
  "HOMEDRIVE",
  "HOMEPATH",
];

/// The passthrough variables that `lookup` has values for
fn passthrough_env(lookup: impl Fn(&str) -> Option<OsString>) -> Vec<(&'static str, OsString)> {
  PASSTHROUGH_ENV
    .iter()
    .filter_map(|key| lookup(key).map(|value| (*key, value)))
    .collect()
}

/// Create a git command with isolated environment
///
/// - Runs in `dir`
/// - Clears environment variables, then passes through [`PASSTHROUGH_ENV`]
/// - Forces the C locale so error messages can be matched
/// - Disables the pager and terminal prompts
fn isolated_git(dir: &Path) -> Command {
  let mut cmd = Command::new("git");

  cmd.arg("-C").arg(dir);

  cmd.env_clear();
  cmd.envs(passthrough_env(|key| std::env::var_os(key)));
  cmd.env("GIT_TERMINAL_PROMPT", "0");
  cmd.env("LC_ALL", "C");

  cmd.arg("--no-pager");
  cmd.arg("-c").arg("core.quotePath=false");

  cmd
}

/// Git backend using system git
pub struct SystemGit {
  /// Directory git commands run in
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = isolated_git(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::VcsOperation(VcsError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::VcsOperation(VcsError::StatusFailed {
        stderr: stderr.trim().to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();
    tracing::debug!(work_tree, "opened git repository");

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  pub(crate) fn git_cmd(&self) -> Command {
    isolated_git(&self.repo_path)
  }

  /// Run git with `args`, returning the raw output regardless of exit status
  pub(crate) fn run(&self, args: &[&str]) -> ReleaseResult<Output> {
    tracing::debug!(command = %format!("git {}", args.join(" ")), "running");
    self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))
  }

  /// Run git with `args` and fail with `CommandFailed` on non-zero exit
  pub(crate) fn run_checked(&self, args: &[&str]) -> ReleaseResult<Output> {
    let output = self.run(args)?;
    if !output.status.success() {
      return Err(ReleaseError::VcsOperation(VcsError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }
    Ok(output)
  }
}

impl Vcs for SystemGit {
  fn root(&self) -> &Path {
    &self.work_tree
  }

  fn has_uncommitted_changes(&self) -> ReleaseResult<bool> {
    self.working_tree_dirty()
  }

  fn create_tag(&self, tag: &str, message: Option<&str>) -> ReleaseResult<()> {
    self.tag(tag, message)
  }

  fn push_tag(&self, remote: &str, tag: &str) -> ReleaseResult<()> {
    self.push_tag_to_remote(remote, tag)
  }
}
