//! Release command implementation
//!
//! Resolves settings, then either prints the plan (`--dry-run`) or runs the
//! coordinator against the system git.

use crate::core::config::ReleaseSettings;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::plan::ReleasePlan;
use crate::core::release::{ReleaseCoordinator, ReleaseRequest};
use crate::core::vcs::SystemRunner;
use std::env;
use std::path::PathBuf;

/// Options that shape a run but are not part of the release itself
#[derive(Debug, Default)]
pub struct RunOptions {
  pub config: Option<PathBuf>,
  pub workspace_root: Option<PathBuf>,
  pub dry_run: bool,
  pub json: bool,
}

/// Run the release command
pub fn run_release(request: ReleaseRequest, options: RunOptions) -> ReleaseResult<()> {
  let current_dir = env::current_dir().context("Failed to read the current directory")?;

  let (mut settings, settings_path) = ReleaseSettings::resolve(options.config.as_deref(), &current_dir)?;
  if let Some(path) = settings_path
    && !options.json
  {
    println!("📦 Loaded settings from {}", path.display());
  }
  if let Some(root) = options.workspace_root {
    settings.workspace.root = Some(root);
  }

  request.validate()?;

  if options.dry_run {
    let plan = ReleasePlan::build(&request, &settings);
    if options.json {
      let json = serde_json::to_string_pretty(&plan).with_context(|| format!("Failed to serialize plan for {}", plan.branch))?;
      println!("{}", json);
    } else {
      print!("{}", plan.to_human_readable(&settings.git.program));
      println!();
      println!("🔍 Dry-run mode (no changes applied)");
    }
    return Ok(());
  }

  let runner = SystemRunner::new(settings.git.env.clone());
  let mut coordinator = ReleaseCoordinator::new(runner, settings);
  let outcome = coordinator.run(&request)?;

  println!();
  println!("✅ Released {} at {}", outcome.branch, outcome.commit);
  println!("   Descriptor: {}", outcome.descriptor_path.display());
  println!("Release automation completed successfully");

  Ok(())
}
