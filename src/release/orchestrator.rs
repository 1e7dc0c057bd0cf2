//! The release workflow
//!
//! Steps run strictly in order and the first failure aborts the run:
//!
//! 1. working tree must be clean (skipped with `force`)
//! 2. resolve the version
//! 3. create the tag, then push it
//! 4. run the publish command with the toolchain override applied
//!
//! Nothing is undone on failure. A tag pushed before a failed publish stays
//! on the remote.

use crate::core::config::ReleaseConfig;
use crate::core::env::ProcessEnv;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::Vcs;
use crate::release::publish::{PublishCommand, Publisher};
use crate::release::version::{self, VersionString};
use serde::Serialize;

/// What a release run does (or did)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
  pub version: String,
  pub version_source: String,
  pub tag: String,
  pub remote: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_message: Option<String>,
  pub publish_command: String,
  pub env_override: String,
  pub forced: bool,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
  /// Dry run: checks passed, nothing was changed
  Planned(ReleasePlan),
  /// Tag pushed and publish succeeded
  Released(ReleasePlan),
}

/// Tag name for a version: `prefix` followed by the version verbatim
pub fn tag_name(prefix: &str, version: &VersionString) -> String {
  format!("{}{}", prefix, version)
}

fn render_message(template: &str, version: &VersionString, tag: &str) -> String {
  template.replace("{version}", version.as_str()).replace("{tag}", tag)
}

/// Drives one release against a VCS and a publisher
pub struct Orchestrator<'a> {
  vcs: &'a dyn Vcs,
  publisher: &'a dyn Publisher,
  ambient: ProcessEnv,
}

impl<'a> Orchestrator<'a> {
  /// `ambient` is the environment the publish override is applied on top of
  pub fn new(vcs: &'a dyn Vcs, publisher: &'a dyn Publisher, ambient: ProcessEnv) -> Self {
    Self {
      vcs,
      publisher,
      ambient,
    }
  }

  pub fn run(&self, config: &ReleaseConfig) -> ReleaseResult<ReleaseOutcome> {
    if let Some(stack) = config.stack_selector {
      tracing::warn!(?stack, "stack argument is accepted but has no effect on the release");
    }

    if config.force {
      tracing::info!("--force given, skipping working tree check");
    } else if self.vcs.has_uncommitted_changes()? {
      return Err(ReleaseError::DirtyWorkingTree {
        path: self.vcs.root().to_path_buf(),
      });
    }

    let source = version::from_config(&config.version_source);
    let version = source.resolve()?;
    tracing::info!(%version, source = %source.describe(), "resolved release version");

    let tag = tag_name(&config.tag.prefix, &version);
    let tag_message = config
      .tag
      .message
      .as_deref()
      .map(|template| render_message(template, &version, &tag));
    let command = PublishCommand::new(config.publish.program.clone(), config.publish.args.clone());

    let plan = ReleasePlan {
      version: version.to_string(),
      version_source: source.describe(),
      tag: tag.clone(),
      remote: config.tag.remote.clone(),
      tag_message: tag_message.clone(),
      publish_command: command.command_line(),
      env_override: format!(
        "{}={}",
        config.publish.env_override.key, config.publish.env_override.value
      ),
      forced: config.force,
    };

    if config.dry_run {
      return Ok(ReleaseOutcome::Planned(plan));
    }

    self.vcs.create_tag(&tag, tag_message.as_deref())?;
    println!("   Created tag: {}", tag);

    self.vcs.push_tag(&config.tag.remote, &tag)?;
    println!("   Pushed {} to {}", tag, config.tag.remote);

    let env_override = &config.publish.env_override;
    let env = self.ambient.with_override(env_override);
    tracing::debug!(
      key = %env_override.key,
      previous = ?self.ambient.get(&env_override.key),
      vars = env.len(),
      "publish environment prepared"
    );
    println!("   Running {}", plan.publish_command);
    self.publisher.publish(&command, &env)?;

    Ok(ReleaseOutcome::Released(plan))
  }
}
