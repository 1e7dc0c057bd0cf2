//! Release command implementation
//!
//! Wires the real git backend and build-tool publisher into the
//! orchestrator and reports the outcome.

use crate::core::config::{CliOverrides, FileConfig, ReleaseConfig};
use crate::core::env::ProcessEnv;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use crate::release::publish::SystemPublisher;
use crate::release::{Orchestrator, ReleaseOutcome, ReleasePlan};
use std::env;

/// Run the release command from the current directory
pub fn run_release(overrides: CliOverrides, json: bool) -> ReleaseResult<()> {
  let workspace_root = env::current_dir()?;

  let file = FileConfig::load_or_default(&workspace_root)?;
  let config = ReleaseConfig::resolve(&workspace_root, file, overrides)?;

  let git = SystemGit::open(&workspace_root)?;
  let publisher = SystemPublisher::new(&workspace_root);

  if !(config.dry_run && json) {
    println!("📦 Releasing from {}", workspace_root.display());
  }

  let outcome = Orchestrator::new(&git, &publisher, ProcessEnv::ambient()).run(&config)?;

  match outcome {
    ReleaseOutcome::Planned(plan) => {
      if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
      } else {
        print_plan(&plan);
        println!();
        println!("🔍 Dry-run mode (no tag created, nothing published)");
      }
    }
    ReleaseOutcome::Released(plan) => {
      println!();
      println!("✅ Release {} completed!", plan.version);
    }
  }

  Ok(())
}

fn print_plan(plan: &ReleasePlan) {
  println!();
  println!("📋 Release Plan");
  println!();
  println!("  Version:  {} (from {})", plan.version, plan.version_source);
  println!("  Tag:      {}", plan.tag);
  if let Some(message) = &plan.tag_message {
    println!("  Message:  {}", message);
  }
  println!("  Remote:   {}", plan.remote);
  println!("  Publish:  {}", plan.publish_command);
  println!("  Env:      {}", plan.env_override);
  if plan.forced {
    println!("  ⚠️  Working tree check skipped (--force)");
  }
}
