//! System git backend
//!
//! Every call goes through the configured `CommandRunner`. Ops run in the
//! checkout directory (clone runs in the process cwd) with a few safe
//! configuration overrides in front of the subcommand.

use super::ops::{GitOp, commit_ops, release_branch_ops};
use super::runner::{CommandRunner, Invocation, Outcome};
use crate::core::error::{GitError, ReleaseResult};
use crate::utils::local_repo_path;
use std::path::Path;

/// Force safe behavior (override user config)
const SAFE_CONFIG: &[&str] = &["advice.detachedHead=false", "core.quotePath=false"];

/// Git backend driving the `git` CLI through a runner
pub struct Git<R: CommandRunner> {
  runner: R,
  program: String,
  remote: String,
}

impl<R: CommandRunner> Git<R> {
  pub fn new(runner: R, program: impl Into<String>, remote: impl Into<String>) -> Self {
    Self {
      runner,
      program: program.into(),
      remote: remote.into(),
    }
  }

  /// Remote name used for every push
  pub fn remote(&self) -> &str {
    &self.remote
  }

  /// Build the invocation for an op
  pub fn invocation(&self, repo: Option<&Path>, op: &GitOp) -> Invocation {
    let mut args = Vec::with_capacity(SAFE_CONFIG.len() * 2 + 6);
    for setting in SAFE_CONFIG {
      args.push("-c".to_string());
      args.push(setting.to_string());
    }
    args.extend(op.args());

    Invocation {
      program: self.program.clone(),
      args,
      cwd: repo.map(Path::to_path_buf),
      capture: op.capture(),
    }
  }

  /// Run one op and interpret its exit status
  pub fn run(&self, repo: Option<&Path>, op: &GitOp) -> ReleaseResult<Outcome> {
    let invocation = self.invocation(repo, op);
    let outcome = self.runner.execute(&invocation).map_err(|source| GitError::Spawn {
      program: self.program.clone(),
      source,
    })?;
    op.check(&outcome)?;
    Ok(outcome)
  }

  /// Run ops in order, stopping at the first failure
  pub fn run_all(&self, repo: &Path, ops: &[GitOp]) -> ReleaseResult<()> {
    for op in ops {
      println!("   $ {} {}", self.program, op.describe());
      self.run(Some(repo), op)?;
    }
    Ok(())
  }

  /// Clone `url` into `dest`
  pub fn clone_repository(&self, url: &str, dest: &Path) -> ReleaseResult<()> {
    // Local sources can be checked without spawning git
    if local_repo_path(url).is_some_and(|path| !path.exists()) {
      return Err(
        GitError::CloneFailed {
          url: url.to_string(),
          reason: "local repository path does not exist".to_string(),
        }
        .into(),
      );
    }

    let op = GitOp::Clone {
      url: url.to_string(),
      dest: dest.to_path_buf(),
    };
    println!("   $ {} {}", self.program, op.describe());
    self.run(None, &op)?;
    Ok(())
  }

  /// Checkout `source_branch`, branch `new_branch` from it and push it
  pub fn cut_release_branch(&self, repo: &Path, source_branch: &str, new_branch: &str) -> ReleaseResult<()> {
    self.run_all(repo, &release_branch_ops(source_branch, new_branch, &self.remote))
  }

  /// Full commit id of HEAD
  pub fn head_commit(&self, repo: &Path) -> ReleaseResult<String> {
    let outcome = self.run(Some(repo), &GitOp::ResolveHead)?;
    Ok(outcome.stdout.trim().to_string())
  }

  /// Stage everything, commit with `message` and push the current branch
  pub fn commit_and_push(&self, repo: &Path, message: &str) -> ReleaseResult<()> {
    self.run_all(repo, &commit_ops(message, &self.remote))
  }
}
