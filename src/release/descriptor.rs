//! Version lookup in XML project descriptors (`pom.xml` and friends)
//!
//! Maven descriptors declare a default namespace on the root element, which
//! would make every element name namespace-qualified. Default `xmlns="..."`
//! declarations are removed before parsing so element paths can be written
//! as plain names (`project/version`). Prefixed declarations are untouched.

use crate::core::error::ConfigError;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

static DEFAULT_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"\s+xmlns\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("default namespace pattern is valid")
});

/// Slash-separated path of element names from the document root
///
/// `project/version` matches `<version>` as a direct child of a `<project>`
/// root, and nothing deeper (so `project/parent/version` is never picked up).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
  segments: Vec<String>,
}

impl ElementPath {
  pub fn parse(path: &str) -> Result<Self, ConfigError> {
    let segments: Vec<String> = path.trim().split('/').map(|s| s.trim().to_string()).collect();
    if segments.iter().any(|s| s.is_empty()) {
      return Err(ConfigError::InvalidField {
        field: "version.path".to_string(),
        reason: format!("'{}' has an empty path segment", path),
      });
    }
    Ok(Self { segments })
  }

  fn matches(&self, stack: &[String]) -> bool {
    self.segments.as_slice() == stack
  }
}

impl fmt::Display for ElementPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.segments.join("/"))
  }
}

/// Remove default namespace declarations (`xmlns="..."`) from a document
pub fn strip_default_namespaces(xml: &str) -> Cow<'_, str> {
  DEFAULT_NAMESPACE.replace_all(xml, "")
}

/// Find the text of the first element at `path`
///
/// The whole document is parsed, so malformed XML is reported even when the
/// element appears before the error. Returns `Ok(None)` when no element
/// matches, and `Err` with a reason when the document is not well-formed.
/// The returned text is trimmed and may be empty.
pub fn find_element_text(xml: &str, path: &ElementPath) -> Result<Option<String>, String> {
  let xml = strip_default_namespaces(xml);
  let mut reader = Reader::from_str(&xml);

  let mut stack: Vec<String> = Vec::new();
  let mut seen_root = false;
  let mut capture: Option<String> = None;
  let mut found: Option<String> = None;

  loop {
    match reader.read_event() {
      Ok(Event::Start(e)) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        open_element(&mut stack, &mut seen_root, name)?;
        if found.is_none() && path.matches(&stack) {
          capture = Some(String::new());
        }
      }
      Ok(Event::Empty(e)) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        open_element(&mut stack, &mut seen_root, name)?;
        if found.is_none() && path.matches(&stack) {
          found = Some(String::new());
        }
        stack.pop();
      }
      Ok(Event::Text(e)) => {
        let text = e.unescape().map_err(|err| err.to_string())?;
        if stack.is_empty() {
          if !text.trim().is_empty() {
            return Err("text outside the root element".to_string());
          }
        } else if let Some(buf) = capture.as_mut()
          && path.matches(&stack)
        {
          buf.push_str(&text);
        }
      }
      Ok(Event::CData(e)) => {
        if let Some(buf) = capture.as_mut()
          && path.matches(&stack)
        {
          buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
        }
      }
      Ok(Event::End(_)) => {
        if capture.is_some() && path.matches(&stack) {
          found = capture.take().map(|text| text.trim().to_string());
        }
        stack.pop();
      }
      Ok(Event::Eof) => break,
      Ok(_) => {}
      Err(e) => {
        return Err(format!("{} (at byte {})", e, reader.error_position()));
      }
    }
  }

  if !seen_root {
    return Err("document has no root element".to_string());
  }
  if let Some(open) = stack.last() {
    return Err(format!("element <{}> is never closed", open));
  }

  Ok(found)
}

fn open_element(stack: &mut Vec<String>, seen_root: &mut bool, name: String) -> Result<(), String> {
  if stack.is_empty() {
    if *seen_root {
      return Err(format!("second root element <{}>", name));
    }
    *seen_root = true;
  }
  stack.push(name);
  Ok(())
}
