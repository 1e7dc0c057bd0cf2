//! Release configuration
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, an optional `release.toml`, and built-in defaults matching a Maven
//! project (`pom.xml`, `mvn clean deploy -P release`, `JAVA_HOME`).

use crate::core::env::{DEFAULT_ENV_KEY, DEFAULT_ENV_VALUE, EnvOverride};
use crate::core::error::{ConfigError, ReleaseResult, ResultExt};
use crate::release::descriptor::ElementPath;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DESCRIPTOR: &str = "pom.xml";
pub const DEFAULT_ELEMENT_PATH: &str = "project/version";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_PROGRAM: &str = "mvn";
pub const DEFAULT_ARGS: &[&str] = &["clean", "deploy", "-P", "release"];

/// Deployment stack named on the command line
///
/// Accepted for compatibility with older release scripts. Nothing downstream
/// reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stack {
  Production,
  Development,
}

/// Contents of `release.toml`
///
/// # Example
///
/// ```toml
/// [version]
/// descriptor = "pom.xml"
/// path = "project/version"
///
/// [tag]
/// prefix = "v"
/// remote = "origin"
///
/// [publish]
/// program = "mvn"
/// args = ["clean", "deploy", "-P", "release"]
/// env_key = "JAVA_HOME"
/// env_value = "/usr/lib/jvm/java-8-jdk"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
  #[serde(default)]
  pub version: VersionSection,
  #[serde(default)]
  pub tag: TagSection,
  #[serde(default)]
  pub publish: PublishSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionSection {
  /// Descriptor file, relative to the working directory
  #[serde(default)]
  pub descriptor: Option<PathBuf>,
  /// Slash-separated element path, starting at the root element
  #[serde(default)]
  pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagSection {
  #[serde(default)]
  pub prefix: Option<String>,
  #[serde(default)]
  pub remote: Option<String>,
  /// Annotation message; `{version}` and `{tag}` are substituted
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishSection {
  #[serde(default)]
  pub program: Option<String>,
  #[serde(default)]
  pub args: Option<Vec<String>>,
  #[serde(default)]
  pub env_key: Option<String>,
  #[serde(default)]
  pub env_value: Option<String>,
}

impl FileConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config if one exists, otherwise return defaults
  pub fn load_or_default(path: &Path) -> ReleaseResult<Self> {
    match Self::find_config_path(path) {
      Some(config_path) => Self::load(&config_path),
      None => Ok(Self::default()),
    }
  }

  /// Load and parse a specific config file
  pub fn load(config_path: &Path) -> ReleaseResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    Self::parse(&content, config_path)
  }

  fn parse(content: &str, config_path: &Path) -> ReleaseResult<Self> {
    let config: FileConfig = toml_edit::de::from_str(content).map_err(|e| ConfigError::Parse {
      path: config_path.to_path_buf(),
      reason: e.to_string(),
    })?;
    tracing::debug!(path = %config_path.display(), "loaded release config");
    Ok(config)
  }
}

/// Values taken from the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub stack: Option<Stack>,
  pub force: bool,
  pub version: Option<String>,
  pub descriptor: Option<PathBuf>,
  pub tag_prefix: Option<String>,
  pub remote: Option<String>,
  pub dry_run: bool,
}

/// Where the release version comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSourceConfig {
  /// Version given verbatim
  Literal(String),
  /// Version read from an XML descriptor
  Descriptor { path: PathBuf, element: ElementPath },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSettings {
  pub prefix: String,
  pub remote: String,
  pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
  pub program: String,
  pub args: Vec<String>,
  pub env_override: EnvOverride,
}

/// Fully resolved configuration for one release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
  pub stack_selector: Option<Stack>,
  pub force: bool,
  pub version_source: VersionSourceConfig,
  pub tag: TagSettings,
  pub publish: PublishSettings,
  pub dry_run: bool,
}

impl ReleaseConfig {
  /// Merge command-line values over file values over defaults
  ///
  /// Relative descriptor paths are resolved against `root`.
  pub fn resolve(root: &Path, file: FileConfig, cli: CliOverrides) -> ReleaseResult<Self> {
    let version_source = match cli.version {
      Some(version) => VersionSourceConfig::Literal(version),
      None => {
        let descriptor = cli
          .descriptor
          .or(file.version.descriptor)
          .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR));
        let element = ElementPath::parse(file.version.path.as_deref().unwrap_or(DEFAULT_ELEMENT_PATH))?;
        VersionSourceConfig::Descriptor {
          path: root.join(descriptor),
          element,
        }
      }
    };

    let remote = cli
      .remote
      .or(file.tag.remote)
      .unwrap_or_else(|| DEFAULT_REMOTE.to_string());
    if remote.trim().is_empty() {
      return Err(invalid("tag.remote", "remote name must not be empty"));
    }

    let tag = TagSettings {
      prefix: cli.tag_prefix.or(file.tag.prefix).unwrap_or_default(),
      remote,
      message: file.tag.message,
    };

    let program = file.publish.program.unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
    if program.trim().is_empty() {
      return Err(invalid("publish.program", "program must not be empty"));
    }

    let env_key = file.publish.env_key.unwrap_or_else(|| DEFAULT_ENV_KEY.to_string());
    if env_key.is_empty() || env_key.contains('=') || env_key.contains('\0') {
      return Err(invalid("publish.env_key", "must be a non-empty variable name without '='"));
    }

    let publish = PublishSettings {
      program,
      args: file
        .publish
        .args
        .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|s| s.to_string()).collect()),
      env_override: EnvOverride {
        key: env_key,
        value: file.publish.env_value.unwrap_or_else(|| DEFAULT_ENV_VALUE.to_string()),
      },
    };

    Ok(Self {
      stack_selector: cli.stack,
      force: cli.force,
      version_source,
      tag,
      publish,
      dry_run: cli.dry_run,
    })
  }
}

fn invalid(field: &str, reason: &str) -> crate::core::error::ReleaseError {
  ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.to_string(),
  }
  .into()
}
