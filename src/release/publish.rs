//! Running the build tool's publish step

use crate::core::env::ProcessEnv;
use crate::core::error::PublishError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// External build command, e.g. `mvn clean deploy -P release`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCommand {
  pub program: String,
  pub args: Vec<String>,
}

impl PublishCommand {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
    }
  }

  /// Space-joined command line for display
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Runs a publish command to completion
pub trait Publisher {
  fn publish(&self, command: &PublishCommand, env: &ProcessEnv) -> Result<(), PublishError>;
}

/// Publisher that spawns the command as a child process
///
/// The child inherits stdout/stderr so build output streams to the
/// terminal. There is no timeout: a hung build hangs the release.
pub struct SystemPublisher {
  working_dir: PathBuf,
}

impl SystemPublisher {
  pub fn new(working_dir: &Path) -> Self {
    Self {
      working_dir: working_dir.to_path_buf(),
    }
  }
}

impl Publisher for SystemPublisher {
  fn publish(&self, command: &PublishCommand, env: &ProcessEnv) -> Result<(), PublishError> {
    tracing::debug!(command = %command.command_line(), dir = %self.working_dir.display(), "running publish command");

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args).current_dir(&self.working_dir);
    env.apply(&mut cmd);

    let status = cmd.status().map_err(|source| PublishError::Spawn {
      program: command.program.clone(),
      source,
    })?;

    if !status.success() {
      return Err(PublishError::Failed {
        command: command.command_line(),
        code: status.code(),
      });
    }

    Ok(())
  }
}
