//! Release version sources

use crate::core::config::VersionSourceConfig;
use crate::core::error::VersionError;
use crate::release::descriptor::{self, ElementPath};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// A non-empty version token
///
/// The contents are not checked against semver or any other scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionString(String);

impl VersionString {
  pub fn new(version: impl Into<String>) -> Option<Self> {
    let version = version.into();
    let trimmed = version.trim();
    if trimmed.is_empty() {
      None
    } else if trimmed.len() == version.len() {
      Some(Self(version))
    } else {
      Some(Self(trimmed.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for VersionString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Somewhere a release version can be read from
pub trait VersionSource {
  /// Resolve the version
  fn resolve(&self) -> Result<VersionString, VersionError>;

  /// Short description for logs and plans
  fn describe(&self) -> String;
}

/// Version given directly by the caller
#[derive(Debug, Clone)]
pub struct LiteralVersion {
  value: String,
}

impl LiteralVersion {
  pub fn new(value: impl Into<String>) -> Self {
    Self { value: value.into() }
  }
}

impl VersionSource for LiteralVersion {
  fn resolve(&self) -> Result<VersionString, VersionError> {
    VersionString::new(self.value.as_str()).ok_or(VersionError::EmptyLiteral)
  }

  fn describe(&self) -> String {
    "command line".to_string()
  }
}

/// Version read from an element in an XML descriptor
#[derive(Debug, Clone)]
pub struct DescriptorVersion {
  path: PathBuf,
  element: ElementPath,
}

impl DescriptorVersion {
  pub fn new(path: impl Into<PathBuf>, element: ElementPath) -> Self {
    Self {
      path: path.into(),
      element,
    }
  }
}

impl VersionSource for DescriptorVersion {
  fn resolve(&self) -> Result<VersionString, VersionError> {
    let content = std::fs::read_to_string(&self.path).map_err(|source| {
      if source.kind() == io::ErrorKind::NotFound {
        VersionError::DescriptorMissing { path: self.path.clone() }
      } else {
        VersionError::Unreadable {
          path: self.path.clone(),
          source,
        }
      }
    })?;

    let text = descriptor::find_element_text(&content, &self.element)
      .map_err(|reason| VersionError::Malformed {
        path: self.path.clone(),
        reason,
      })?
      .ok_or_else(|| VersionError::ElementMissing {
        path: self.path.clone(),
        element: self.element.to_string(),
      })?;

    VersionString::new(text).ok_or_else(|| VersionError::ElementEmpty {
      path: self.path.clone(),
      element: self.element.to_string(),
    })
  }

  fn describe(&self) -> String {
    format!("{} ({})", self.path.display(), self.element)
  }
}

/// Build the version source selected by configuration
pub fn from_config(config: &VersionSourceConfig) -> Box<dyn VersionSource> {
  match config {
    VersionSourceConfig::Literal(value) => Box::new(LiteralVersion::new(value.clone())),
    VersionSourceConfig::Descriptor { path, element } => Box::new(DescriptorVersion::new(path.clone(), element.clone())),
  }
}
