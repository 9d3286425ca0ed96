//! Dry-run plan for a release
//!
//! A `ReleasePlan` lists every step the coordinator would take, built from the
//! same op lists the coordinator executes. Plans are JSON-serializable for
//! review in CI.
//!
//! ```text
//! ReleaseRequest + ReleaseSettings
//!   ↓
//! ReleasePlan (what to do)
//!   ↓
//! to_human_readable() / JSON
//! ```

use crate::core::config::ReleaseSettings;
use crate::core::descriptor::DeploymentEntry;
use crate::core::release::ReleaseRequest;
use crate::core::vcs::GitOp;
use crate::core::vcs::ops::{commit_ops, release_branch_ops};
use crate::utils::slash_path;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Placeholder for the per-run workspace directory
const WORKSPACE: &str = "<workspace>";

/// A single planned step
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PlannedStep {
  /// Create the workspace under `root`
  AcquireWorkspace { root: String },

  /// Run a git op, in `repo` when set
  Git {
    repo: Option<String>,
    #[serde(flatten)]
    op: GitOp,
  },

  /// Write the descriptor (commit filled in at run time)
  WriteDescriptor { path: String },

  /// Remove the workspace
  ReleaseWorkspace,
}

/// One pipeline phase of the plan
#[derive(Debug, Clone, Serialize)]
pub struct PlannedPhase {
  pub name: String,
  pub steps: Vec<PlannedStep>,
}

/// Everything a run would do, without doing it
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub branch: String,
  pub descriptor_path: String,
  pub commit_message: String,
  pub deploy_entry: DeploymentEntry,
  pub phases: Vec<PlannedPhase>,
}

impl ReleasePlan {
  /// Build the plan for `request`
  pub fn build(request: &ReleaseRequest, settings: &ReleaseSettings) -> Self {
    let branch = request.branch_name();
    let remote = settings.git.remote.as_str();
    let descriptor = settings.descriptor_relative_path(&request.descriptor_file_name());
    let workspace = PathBuf::from(WORKSPACE);
    let target = workspace.join("target");
    let config = workspace.join("config");

    let in_repo = |repo: &Path, op: GitOp| PlannedStep::Git {
      repo: Some(slash_path(repo)),
      op,
    };
    let clone = |url: &str, dest: &Path| PlannedStep::Git {
      repo: None,
      op: GitOp::Clone {
        url: url.to_string(),
        dest: dest.to_path_buf(),
      },
    };

    let mut target_steps = vec![clone(&request.target_repo, &target)];
    target_steps.extend(
      release_branch_ops(&request.source_branch, &branch, remote)
        .into_iter()
        .map(|op| in_repo(&target, op)),
    );
    target_steps.push(in_repo(&target, GitOp::ResolveHead));

    let commit_message = settings
      .commit
      .render(&request.project, &request.version, &branch, request.suffix());

    let mut config_steps = vec![
      clone(&request.config_repo, &config),
      PlannedStep::WriteDescriptor {
        path: slash_path(&config.join(&descriptor)),
      },
    ];
    config_steps.extend(
      commit_ops(&commit_message, remote)
        .into_iter()
        .map(|op| in_repo(&config, op)),
    );

    let phases = vec![
      PlannedPhase {
        name: "setup".to_string(),
        steps: vec![PlannedStep::AcquireWorkspace {
          root: slash_path(&settings.workspace.root_or_default()),
        }],
      },
      PlannedPhase {
        name: "target repo".to_string(),
        steps: target_steps,
      },
      PlannedPhase {
        name: "config repo".to_string(),
        steps: config_steps,
      },
      PlannedPhase {
        name: "cleanup".to_string(),
        steps: vec![PlannedStep::ReleaseWorkspace],
      },
    ];

    Self {
      deploy_entry: DeploymentEntry {
        name: request.deploy_entry_name(),
        branch: branch.clone(),
        commit: "<HEAD after push>".to_string(),
      },
      branch,
      descriptor_path: slash_path(&descriptor),
      commit_message,
      phases,
    }
  }

  /// Total number of steps
  pub fn step_count(&self) -> usize {
    self.phases.iter().map(|p| p.steps.len()).sum()
  }

  /// Render for terminal output
  pub fn to_human_readable(&self, git_program: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Release plan for {} ({} steps)", self.branch, self.step_count());
    let _ = writeln!(out, "   Descriptor:     {}", self.descriptor_path);
    let _ = writeln!(out, "   Deploy entry:   {}", self.deploy_entry.name);
    let _ = writeln!(out, "   Commit message: {}", self.commit_message);

    for (i, phase) in self.phases.iter().enumerate() {
      let _ = writeln!(out, "\n {}. {}", i + 1, phase.name);
      for step in &phase.steps {
        let line = match step {
          PlannedStep::AcquireWorkspace { root } => format!("create workspace under {}", root),
          PlannedStep::Git { repo: Some(repo), op } => format!("(in {}) $ {} {}", repo, git_program, op.describe()),
          PlannedStep::Git { repo: None, op } => format!("$ {} {}", git_program, op.describe()),
          PlannedStep::WriteDescriptor { path } => format!("write {}", path),
          PlannedStep::ReleaseWorkspace => "remove workspace".to_string(),
        };
        let _ = writeln!(out, "    - {}", line);
      }
    }

    out
  }
}
