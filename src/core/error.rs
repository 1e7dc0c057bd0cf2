//! Error types for tagrelease with contextual messages and exit codes
//!
//! Every step of a release has its own error variant so the user can tell
//! which step failed. Errors are never recovered locally: the first one
//! aborts the run and is printed by [`print_error`].

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for tagrelease
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, unresolvable version)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Precondition not met (dirty working tree)
  Precondition = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for tagrelease
#[derive(Debug)]
pub enum ReleaseError {
  /// Uncommitted changes to tracked files and `--force` not given
  DirtyWorkingTree { path: PathBuf },

  /// Version could not be determined
  VersionResolution(VersionError),

  /// Tag creation or push failed
  VcsOperation(VcsError),

  /// External publish command failed
  Publish(PublishError),

  /// Configuration file errors
  Config(ConfigError),

  /// I/O errors, including failure to start git
  Io { source: io::Error, context: Option<String> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io { source, context } => ReleaseError::Io {
        source,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      _ => self,
    }
  }

  /// Name of the release step that failed, for diagnostics
  pub fn step(&self) -> &'static str {
    match self {
      ReleaseError::DirtyWorkingTree { .. } => "precondition check",
      ReleaseError::VersionResolution(_) => "version resolution",
      ReleaseError::VcsOperation(e) => e.step(),
      ReleaseError::Publish(_) => "publish",
      ReleaseError::Config(_) => "configuration",
      ReleaseError::Io { .. } | ReleaseError::Message { .. } => "setup",
    }
  }

  /// Get the process exit code for this error
  ///
  /// A publish failure propagates the child's own exit code when it has one.
  pub fn exit_code(&self) -> i32 {
    match self {
      ReleaseError::DirtyWorkingTree { .. } => ExitCode::Precondition.as_i32(),
      ReleaseError::VersionResolution(_) => ExitCode::User.as_i32(),
      ReleaseError::VcsOperation(_) => ExitCode::System.as_i32(),
      ReleaseError::Publish(PublishError::Failed { code: Some(code), .. }) if *code != 0 => *code,
      ReleaseError::Publish(_) => ExitCode::System.as_i32(),
      ReleaseError::Config(_) => ExitCode::User.as_i32(),
      ReleaseError::Io { .. } => ExitCode::System.as_i32(),
      ReleaseError::Message { .. } => ExitCode::User.as_i32(),
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::DirtyWorkingTree { .. } => {
        Some("Commit or stash your changes, or pass --force to release anyway.".to_string())
      }
      ReleaseError::VersionResolution(e) => e.help_message(),
      ReleaseError::VcsOperation(e) => e.help_message(),
      ReleaseError::Publish(e) => e.help_message(),
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io { .. } => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::DirtyWorkingTree { path } => {
        write!(f, "Working directory must be clean: {}", path.display())
      }
      ReleaseError::VersionResolution(e) => write!(f, "{}", e),
      ReleaseError::VcsOperation(e) => write!(f, "{}", e),
      ReleaseError::Publish(e) => write!(f, "{}", e),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Io { source, context } => {
        write!(f, "I/O error: {}", source)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io { source, .. } => Some(source),
      ReleaseError::VersionResolution(VersionError::Unreadable { source, .. }) => Some(source),
      ReleaseError::Publish(PublishError::Spawn { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io {
      source: err,
      context: None,
    }
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<VersionError> for ReleaseError {
  fn from(err: VersionError) -> Self {
    ReleaseError::VersionResolution(err)
  }
}

impl From<VcsError> for ReleaseError {
  fn from(err: VcsError) -> Self {
    ReleaseError::VcsOperation(err)
  }
}

impl From<PublishError> for ReleaseError {
  fn from(err: PublishError) -> Self {
    ReleaseError::Publish(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

/// Version resolution errors
#[derive(Debug)]
pub enum VersionError {
  /// Descriptor file does not exist
  DescriptorMissing { path: PathBuf },

  /// Descriptor file exists but could not be read
  Unreadable { path: PathBuf, source: io::Error },

  /// Descriptor is not well-formed XML
  Malformed { path: PathBuf, reason: String },

  /// Version element not present at the expected path
  ElementMissing { path: PathBuf, element: String },

  /// Version element present but has no text
  ElementEmpty { path: PathBuf, element: String },

  /// Literal version was blank
  EmptyLiteral,
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::DescriptorMissing { .. } => {
        Some("Run from the project root, pass --descriptor <PATH>, or give the version with --release-version.".to_string())
      }
      VersionError::ElementMissing { element, .. } => Some(format!(
        "Add a <{}> element or set [version] path in release.toml.",
        element.rsplit('/').next().unwrap_or(element)
      )),
      _ => None,
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::DescriptorMissing { path } => {
        write!(f, "Descriptor file not found: {}", path.display())
      }
      VersionError::Unreadable { path, source } => {
        write!(f, "Failed to read descriptor {}: {}", path.display(), source)
      }
      VersionError::Malformed { path, reason } => {
        write!(f, "Descriptor {} is not valid XML: {}", path.display(), reason)
      }
      VersionError::ElementMissing { path, element } => {
        write!(f, "No <{}> element in {}", element, path.display())
      }
      VersionError::ElementEmpty { path, element } => {
        write!(f, "Element <{}> in {} is empty", element, path.display())
      }
      VersionError::EmptyLiteral => write!(f, "Version must not be empty"),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum VcsError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Working tree status could not be determined (e.g. no commit yet)
  StatusFailed { stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Tag already exists locally
  TagExists { tag: String },

  /// Push rejected or remote unreachable
  PushFailed { remote: String, tag: String, reason: String },
}

impl VcsError {
  fn step(&self) -> &'static str {
    match self {
      VcsError::RepoNotFound { .. } | VcsError::StatusFailed { .. } => "precondition check",
      VcsError::CommandFailed { .. } | VcsError::TagExists { .. } => "tag creation",
      VcsError::PushFailed { .. } => "tag push",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      VcsError::TagExists { tag } => Some(format!(
        "This version was already released. Bump the version, or delete the tag with `git tag -d {}`.",
        tag
      )),
      VcsError::PushFailed { reason, .. } => {
        if reason.contains("already exists") {
          Some("The remote already has this tag. Bump the version before releasing.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check your SSH key or credentials for the remote.".to_string())
        } else {
          None
        }
      }
      VcsError::RepoNotFound { path } => Some(format!("Run tagrelease inside a git repository (tried {})", path.display())),
      VcsError::StatusFailed { .. } => Some("Make sure the repository has at least one commit.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for VcsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VcsError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      VcsError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      VcsError::StatusFailed { stderr } => {
        write!(f, "Could not read working tree status: {}", stderr)
      }
      VcsError::TagExists { tag } => write!(f, "Tag '{}' already exists", tag),
      VcsError::PushFailed { remote, tag, reason } => {
        write!(f, "Push of tag {} to {} failed: {}", tag, remote, reason)
      }
    }
  }
}

/// Publish command errors
#[derive(Debug)]
pub enum PublishError {
  /// Command could not be started
  Spawn { program: String, source: io::Error },

  /// Command ran and exited unsuccessfully
  Failed { command: String, code: Option<i32> },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::Spawn { program, .. } => Some(format!(
        "Make sure '{}' is installed and on PATH, or set [publish] program in release.toml.",
        program
      )),
      PublishError::Failed { .. } => {
        Some("The release tag was already pushed and has not been removed.".to_string())
      }
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::Spawn { program, source } => {
        write!(f, "Failed to start publish command '{}': {}", program, source)
      }
      PublishError::Failed { command, code: Some(code) } => {
        write!(f, "Publish command `{}` exited with status {}", command, code)
      }
      PublishError::Failed { command, code: None } => {
        write!(f, "Publish command `{}` was terminated by a signal", command)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file could not be parsed
  Parse { path: PathBuf, reason: String },

  /// Field present but with an unusable value
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => Some("Check release.toml against the documented [version], [tag] and [publish] tables.".to_string()),
      ConfigError::InvalidField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse config from {}: {}", path.display(), reason)
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid value for '{}': {}", field, reason)
      }
    }
  }
}

/// Result type alias for tagrelease
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with the failing step and help text
pub fn print_error(error: &ReleaseError) {
  tracing::error!(step = error.step(), "release aborted");
  eprintln!("\n❌ Release failed during {}: {}\n", error.step(), error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
