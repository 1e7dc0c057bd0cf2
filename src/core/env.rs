//! Process environment for child commands
//!
//! The publish step needs the ambient environment plus one override (the
//! toolchain home, `JAVA_HOME` by default). Rather than calling
//! `std::env::set_var`, the environment is snapshotted into an immutable
//! [`ProcessEnv`] value that is handed to the child's `Command`.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::process::Command;

/// Default toolchain home variable overridden for the publish step
pub const DEFAULT_ENV_KEY: &str = "JAVA_HOME";

/// Default toolchain home path
pub const DEFAULT_ENV_VALUE: &str = "/usr/lib/jvm/java-8-jdk";

/// A single environment variable override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
  pub key: String,
  pub value: String,
}

impl Default for EnvOverride {
  fn default() -> Self {
    Self {
      key: DEFAULT_ENV_KEY.to_string(),
      value: DEFAULT_ENV_VALUE.to_string(),
    }
  }
}

/// Immutable snapshot of environment variables for a child process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessEnv {
  vars: BTreeMap<OsString, OsString>,
}

impl ProcessEnv {
  /// Snapshot the current process environment
  pub fn ambient() -> Self {
    Self::from_vars(std::env::vars_os())
  }

  /// Build from an explicit set of variables
  pub fn from_vars<I, K, V>(vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
  {
    Self {
      vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  /// Return a copy with one variable set; `self` is left untouched
  pub fn with_override(&self, env_override: &EnvOverride) -> Self {
    let mut vars = self.vars.clone();
    vars.insert(OsString::from(&env_override.key), OsString::from(&env_override.value));
    Self { vars }
  }

  pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
    self.vars.get(key.as_ref()).map(OsString::as_os_str)
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
    self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
  }

  /// Replace the command's environment with exactly this snapshot
  pub fn apply(&self, cmd: &mut Command) {
    cmd.env_clear();
    cmd.envs(self.iter());
  }
}
