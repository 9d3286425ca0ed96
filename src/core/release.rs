//! Release coordinator
//!
//! Runs the four-phase pipeline:
//!
//! ```text
//! setup        -> workspace directory
//! target repo  -> clone, cut <source>-v<version>, push, resolve HEAD
//! config repo  -> clone, write descriptor, commit, push
//! cleanup      -> workspace removed (always, once setup succeeded)
//! ```
//!
//! The pipeline is fail-fast and not transactional: a branch pushed in the
//! target phase stays pushed when the config phase fails. The error carries
//! the last state reached so the user knows what to clean up before retrying.

use crate::core::config::ReleaseSettings;
use crate::core::descriptor::{
  DeploymentEntry, ReleaseRecord, descriptor_file_name, release_branch_name, write_release_descriptor,
};
use crate::core::error::{Phase, ReleaseError, ReleaseResult};
use crate::core::vcs::{CommandRunner, Git};
use crate::core::workspace::Workspace;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Pipeline state, advanced after each completed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
  Init,
  WorkspaceReady,
  TargetCloned,
  BranchCut,
  CommitResolved,
  ConfigCloned,
  DescriptorWritten,
  Pushed,
  Done,
  Failed,
}

impl RunState {
  /// Remote side effects that survive a failure after this state
  pub fn partial_effects(&self) -> Option<String> {
    match self {
      RunState::BranchCut
      | RunState::CommitResolved
      | RunState::ConfigCloned
      | RunState::DescriptorWritten => Some(
        "The release branch was already pushed to the target repository; delete it there before retrying.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RunState::Init => "init",
      RunState::WorkspaceReady => "workspace ready",
      RunState::TargetCloned => "target cloned",
      RunState::BranchCut => "branch cut",
      RunState::CommitResolved => "commit resolved",
      RunState::ConfigCloned => "config cloned",
      RunState::DescriptorWritten => "descriptor written",
      RunState::Pushed => "pushed",
      RunState::Done => "done",
      RunState::Failed => "failed",
    };
    write!(f, "{}", name)
  }
}

/// Inputs of one release run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseRequest {
  pub target_repo: String,
  pub config_repo: String,
  pub source_branch: String,
  pub version: String,
  pub project: String,
  pub suffix: Option<String>,
  /// Deployment entry name (default: suffix, else project)
  pub deploy_name: Option<String>,
  /// Recorded in the descriptor's `source` array
  pub sources: Vec<String>,
  /// Recorded in the descriptor's `repositories` array
  pub repositories: Vec<String>,
}

impl ReleaseRequest {
  pub fn new(
    target_repo: impl Into<String>,
    config_repo: impl Into<String>,
    source_branch: impl Into<String>,
    version: impl Into<String>,
    project: impl Into<String>,
    suffix: Option<String>,
  ) -> Self {
    Self {
      target_repo: target_repo.into(),
      config_repo: config_repo.into(),
      source_branch: source_branch.into(),
      version: version.into(),
      project: project.into(),
      suffix,
      ..Default::default()
    }
  }

  /// Suffix, if present and non-empty
  pub fn suffix(&self) -> Option<&str> {
    self.suffix.as_deref().filter(|s| !s.is_empty())
  }

  pub fn branch_name(&self) -> String {
    release_branch_name(&self.source_branch, &self.version)
  }

  pub fn descriptor_file_name(&self) -> String {
    descriptor_file_name(&self.project, &self.version, self.suffix())
  }

  pub fn deploy_entry_name(&self) -> String {
    match self.deploy_name.as_deref().filter(|s| !s.is_empty()) {
      Some(name) => name.to_string(),
      None => self.suffix().unwrap_or(&self.project).to_string(),
    }
  }

  /// Build the descriptor for a resolved commit
  pub fn record(&self, label: &str, entry: DeploymentEntry) -> ReleaseRecord {
    ReleaseRecord {
      release: label.to_string(),
      project: self.project.clone(),
      source: self.sources.clone(),
      deploy: vec![entry],
      repositories: self.repositories.clone(),
    }
  }

  /// Reject requests that cannot name a branch or descriptor
  pub fn validate(&self) -> ReleaseResult<()> {
    let required = [
      ("target repository", &self.target_repo),
      ("config repository", &self.config_repo),
      ("source branch", &self.source_branch),
      ("version", &self.version),
      ("project name", &self.project),
    ];
    for (name, value) in required {
      if value.trim().is_empty() {
        return Err(ReleaseError::usage(format!("{} must not be empty", name)));
      }
    }

    // Git would read a leading dash as an option
    if self.source_branch.starts_with('-') {
      return Err(ReleaseError::usage(format!(
        "source branch '{}' must not start with '-'",
        self.source_branch
      )));
    }

    // These become part of the descriptor file name
    let mut name_parts = vec![("project name", self.project.as_str()), ("version", self.version.as_str())];
    if let Some(suffix) = self.suffix() {
      name_parts.push(("file suffix", suffix));
    }
    for (name, value) in name_parts {
      if value.contains('/') || value.contains('\\') || value.contains("..") {
        return Err(ReleaseError::usage(format!(
          "{} '{}' must not contain path separators or '..'",
          name, value
        )));
      }
    }

    Ok(())
  }
}

/// What a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
  pub branch: String,
  pub commit: String,
  /// Relative to the config repository root
  pub descriptor_path: PathBuf,
  pub record: ReleaseRecord,
}

/// Drives one release through the pipeline
pub struct ReleaseCoordinator<R: CommandRunner> {
  git: Git<R>,
  settings: ReleaseSettings,
  state: RunState,
}

impl<R: CommandRunner> ReleaseCoordinator<R> {
  pub fn new(runner: R, settings: ReleaseSettings) -> Self {
    let git = Git::new(runner, settings.git.program.clone(), settings.git.remote.clone());
    Self {
      git,
      settings,
      state: RunState::Init,
    }
  }

  /// Current (or final) state
  #[cfg(test)]
  pub fn state(&self) -> RunState {
    self.state
  }

  /// Run the whole pipeline
  pub fn run(&mut self, request: &ReleaseRequest) -> ReleaseResult<ReleaseOutcome> {
    self.state = RunState::Init;
    request.validate()?;

    let root = self.settings.workspace.root_or_default();
    let workspace = match Workspace::acquire(&root) {
      Ok(ws) => ws,
      Err(e) => return Err(self.fail(e, Phase::Setup)),
    };
    self.advance(RunState::WorkspaceReady);
    println!("📁 Workspace: {}", workspace.path().display());

    let result = self.run_phases(&workspace, request);

    workspace.release();

    if result.is_ok() {
      self.advance(RunState::Done);
    }
    result
  }

  fn run_phases(&mut self, workspace: &Workspace, request: &ReleaseRequest) -> ReleaseResult<ReleaseOutcome> {
    let entry = match self.handle_target_repo(workspace, request) {
      Ok(entry) => entry,
      Err(e) => return Err(self.fail(e, Phase::TargetRepo)),
    };

    match self.handle_config_repo(workspace, request, entry) {
      Ok(outcome) => Ok(outcome),
      Err(e) => Err(self.fail(e, Phase::ConfigRepo)),
    }
  }

  fn handle_target_repo(&mut self, workspace: &Workspace, request: &ReleaseRequest) -> ReleaseResult<DeploymentEntry> {
    let target = workspace.target_dir();
    let branch = request.branch_name();

    println!("\n📦 Cloning target repository {}", request.target_repo);
    self.git.clone_repository(&request.target_repo, &target)?;
    self.advance(RunState::TargetCloned);

    println!("\n🌿 Cutting {} from {}", branch, request.source_branch);
    self.git.cut_release_branch(&target, &request.source_branch, &branch)?;
    self.advance(RunState::BranchCut);

    let commit = self.git.head_commit(&target)?;
    self.advance(RunState::CommitResolved);
    println!("   ✅ {} at {}", branch, commit);

    Ok(DeploymentEntry {
      name: request.deploy_entry_name(),
      branch,
      commit,
    })
  }

  fn handle_config_repo(
    &mut self,
    workspace: &Workspace,
    request: &ReleaseRequest,
    entry: DeploymentEntry,
  ) -> ReleaseResult<ReleaseOutcome> {
    let config = workspace.config_dir();

    println!("\n📦 Cloning config repository {}", request.config_repo);
    self.git.clone_repository(&request.config_repo, &config)?;
    self.advance(RunState::ConfigCloned);

    let descriptor_path = self.settings.descriptor_relative_path(&request.descriptor_file_name());
    let branch = entry.branch.clone();
    let commit = entry.commit.clone();
    let record = request.record(&self.settings.release.label, entry);

    println!("\n📝 Writing {}", descriptor_path.display());
    write_release_descriptor(&config.join(&descriptor_path), &record)?;
    self.advance(RunState::DescriptorWritten);

    let message = self
      .settings
      .commit
      .render(&request.project, &request.version, &branch, request.suffix());
    println!("\n🚀 Committing and pushing to {}", self.git.remote());
    self.git.commit_and_push(&config, &message)?;
    self.advance(RunState::Pushed);

    Ok(ReleaseOutcome {
      branch,
      commit,
      descriptor_path,
      record,
    })
  }

  fn advance(&mut self, next: RunState) {
    self.state = next;
  }

  /// Mark the run failed and wrap `err` with its phase and last state
  fn fail(&mut self, err: ReleaseError, phase: Phase) -> ReleaseError {
    let last_state = self.state;
    self.state = RunState::Failed;
    err.in_phase(phase, last_state)
  }
}
