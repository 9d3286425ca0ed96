//! Typed git operations
//!
//! Branch cutting and commit/push are ordered lists of `GitOp`. Each op knows
//! its arguments and how to read its own exit status, so a failure at step N
//! maps to exactly one error.

use super::runner::{Capture, Outcome};
use crate::core::error::GitError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One git subcommand with its interpretation rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitOp {
  /// Clone a repository into `dest`
  Clone { url: String, dest: PathBuf },

  /// Checkout an existing branch
  Checkout { branch: String },

  /// Fail when `branch` already exists on `remote`
  VerifyBranchAbsent { remote: String, branch: String },

  /// Create and checkout a new branch from HEAD
  CreateBranch { name: String },

  /// Push a named branch
  PushBranch { remote: String, branch: String },

  /// Resolve HEAD to a full commit id
  ResolveHead,

  /// Stage every change in the work tree
  StageAll,

  /// Fail when the index matches HEAD
  RequireStagedChanges,

  /// Commit the index
  Commit { message: String },

  /// Push the current branch
  PushHead { remote: String },
}

impl GitOp {
  /// Short step name used in errors and plans
  pub fn step_name(&self) -> &'static str {
    match self {
      GitOp::Clone { .. } => "clone",
      GitOp::Checkout { .. } => "checkout",
      GitOp::VerifyBranchAbsent { .. } => "verify-absent",
      GitOp::CreateBranch { .. } => "create-branch",
      GitOp::PushBranch { .. } => "push-branch",
      GitOp::ResolveHead => "rev-parse",
      GitOp::StageAll => "stage",
      GitOp::RequireStagedChanges => "require-changes",
      GitOp::Commit { .. } => "commit",
      GitOp::PushHead { .. } => "push",
    }
  }

  /// Subcommand arguments (without global options)
  pub fn args(&self) -> Vec<String> {
    let owned = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<String>>();
    match self {
      GitOp::Clone { url, dest } => vec![
        "clone".to_string(),
        "--".to_string(),
        url.clone(),
        dest.to_string_lossy().into_owned(),
      ],
      GitOp::Checkout { branch } => owned(&["checkout", branch.as_str()]),
      GitOp::VerifyBranchAbsent { remote, branch } => {
        // Fully qualified so `team/<branch>` does not match
        let head_ref = format!("refs/heads/{}", branch);
        owned(&["ls-remote", "--exit-code", remote.as_str(), head_ref.as_str()])
      }
      GitOp::CreateBranch { name } => owned(&["checkout", "-b", name.as_str()]),
      GitOp::PushBranch { remote, branch } => owned(&["push", remote.as_str(), branch.as_str()]),
      GitOp::ResolveHead => owned(&["rev-parse", "HEAD"]),
      GitOp::StageAll => owned(&["add", "."]),
      GitOp::RequireStagedChanges => owned(&["diff", "--cached", "--quiet"]),
      GitOp::Commit { message } => owned(&["commit", "-m", message.as_str()]),
      GitOp::PushHead { remote } => owned(&["push", remote.as_str(), "HEAD"]),
    }
  }

  /// Whether stdout must be captured
  pub fn capture(&self) -> Capture {
    match self {
      GitOp::ResolveHead => Capture::Stdout,
      _ => Capture::Inherit,
    }
  }

  /// Human-readable form, e.g. `checkout -b develop-v1.0.0`
  pub fn describe(&self) -> String {
    self.args().join(" ")
  }

  /// Map the exit status of this op to success or a typed error
  pub fn check(&self, outcome: &Outcome) -> Result<(), GitError> {
    match self {
      GitOp::Clone { url, .. } => require_success(outcome).map_err(|reason| GitError::CloneFailed {
        url: url.clone(),
        reason,
      }),
      GitOp::Checkout { branch } => require_success(outcome).map_err(|reason| self.branch_error(branch, reason)),
      GitOp::CreateBranch { name } => require_success(outcome).map_err(|reason| self.branch_error(name, reason)),
      GitOp::PushBranch { branch, .. } => {
        require_success(outcome).map_err(|reason| self.branch_error(branch, reason))
      }
      GitOp::VerifyBranchAbsent { remote, branch } => match outcome.code {
        // --exit-code: 2 means no matching ref
        Some(2) => Ok(()),
        Some(0) => Err(self.branch_error(branch, format!("branch already exists on '{}'", remote))),
        _ => Err(self.branch_error(branch, outcome.status_text())),
      },
      GitOp::ResolveHead => {
        require_success(outcome).map_err(|reason| GitError::ResolveFailed { reason })?;
        if outcome.stdout.trim().is_empty() {
          return Err(GitError::ResolveFailed {
            reason: "git rev-parse printed no commit".to_string(),
          });
        }
        Ok(())
      }
      GitOp::StageAll | GitOp::Commit { .. } => {
        require_success(outcome).map_err(|reason| GitError::CommitFailed { reason })
      }
      GitOp::RequireStagedChanges => match outcome.code {
        // --quiet: 1 means the index differs from HEAD
        Some(1) => Ok(()),
        Some(0) => Err(GitError::NothingToCommit),
        _ => Err(GitError::CommitFailed {
          reason: outcome.status_text(),
        }),
      },
      GitOp::PushHead { remote } => require_success(outcome).map_err(|reason| GitError::PushFailed {
        remote: remote.clone(),
        branch: "HEAD".to_string(),
        reason,
      }),
    }
  }

  fn branch_error(&self, branch: &str, reason: String) -> GitError {
    GitError::BranchError {
      branch: branch.to_string(),
      step: self.step_name().to_string(),
      reason,
    }
  }
}

fn require_success(outcome: &Outcome) -> Result<(), String> {
  if outcome.success() {
    Ok(())
  } else {
    Err(outcome.status_text())
  }
}

/// Ordered steps that cut `new_branch` from `source_branch` and publish it
pub fn release_branch_ops(source_branch: &str, new_branch: &str, remote: &str) -> Vec<GitOp> {
  vec![
    GitOp::Checkout {
      branch: source_branch.to_string(),
    },
    GitOp::VerifyBranchAbsent {
      remote: remote.to_string(),
      branch: new_branch.to_string(),
    },
    GitOp::CreateBranch {
      name: new_branch.to_string(),
    },
    GitOp::PushBranch {
      remote: remote.to_string(),
      branch: new_branch.to_string(),
    },
  ]
}

/// Ordered steps that record all work-tree changes and push them
pub fn commit_ops(message: &str, remote: &str) -> Vec<GitOp> {
  vec![
    GitOp::StageAll,
    GitOp::RequireStagedChanges,
    GitOp::Commit {
      message: message.to_string(),
    },
    GitOp::PushHead {
      remote: remote.to_string(),
    },
  ]
}
