//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Bare target/config repositories plus the directories a run needs
pub struct ReleaseFixture {
  _root: TempDir,
  pub root: PathBuf,
  /// Bare repo with `main` and `develop`
  pub target: PathBuf,
  /// Bare repo with a single commit on `main`
  pub config: PathBuf,
  /// Process cwd for the binary (settings are looked up here)
  pub work: PathBuf,
  /// Parent directory for per-run workspaces
  pub workspaces: PathBuf,
  /// HOME for the binary, keeps the user's git config out
  pub home: PathBuf,
}

impl ReleaseFixture {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    let work = path.join("work");
    let workspaces = path.join("workspaces");
    let home = path.join("home");
    for dir in [&work, &workspaces, &home] {
      std::fs::create_dir_all(dir)?;
    }

    let target = path.join("remotes").join("target.git");
    let config = path.join("remotes").join("config.git");
    init_bare(&target)?;
    init_bare(&config)?;

    let seed = path.join("seed-target");
    seed_repo(&seed, &target, "README.md", "# target\n")?;
    git(&seed, &["checkout", "-b", "develop"])?;
    std::fs::write(seed.join("CHANGELOG.md"), "## develop\n")?;
    git(&seed, &["add", "."])?;
    git(&seed, &["commit", "-m", "Start develop"])?;
    git(&seed, &["push", "origin", "develop"])?;

    let seed = path.join("seed-config");
    seed_repo(&seed, &config, "README.md", "# config\n")?;

    Ok(Self {
      _root: root,
      root: path,
      target,
      config,
      work,
      workspaces,
      home,
    })
  }

  pub fn target_url(&self) -> String {
    self.target.to_string_lossy().into_owned()
  }

  pub fn config_url(&self) -> String {
    self.config.to_string_lossy().into_owned()
  }

  /// Commit id of `branch` in the bare target repo, if it exists
  pub fn target_branch_commit(&self, branch: &str) -> Result<Option<String>> {
    branch_commit(&self.target, branch)
  }

  /// Fresh checkout of the config repo's `main`
  pub fn checkout_config(&self, name: &str) -> Result<PathBuf> {
    let dest = self.root.join(name);
    git(&self.root, &["clone", "--quiet", &self.config_url(), &dest.to_string_lossy()])?;
    Ok(dest)
  }

  /// Number of commits on `main` in the config repo
  pub fn config_commit_count(&self) -> Result<usize> {
    let output = git(&self.config, &["rev-list", "--count", "main"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// True when no workspace directories are left behind
  pub fn workspaces_empty(&self) -> Result<bool> {
    Ok(std::fs::read_dir(&self.workspaces)?.next().is_none())
  }

  /// Run the binary with `args` followed by `--workspace-root`
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let workspace_root = self.workspaces.to_string_lossy().into_owned();
    let mut full: Vec<&str> = args.to_vec();
    full.extend(["--workspace-root", workspace_root.as_str()]);
    run_release(&self.work, &self.home, &full, None)
  }
}

fn init_bare(path: &Path) -> Result<()> {
  std::fs::create_dir_all(path)?;
  git(path, &["init", "--quiet", "--bare", "--initial-branch=main"])?;
  Ok(())
}

fn seed_repo(seed: &Path, remote: &Path, file: &str, content: &str) -> Result<()> {
  std::fs::create_dir_all(seed)?;
  git(seed, &["init", "--quiet", "--initial-branch=main"])?;
  git(seed, &["config", "user.name", "Test User"])?;
  git(seed, &["config", "user.email", "test@example.com"])?;
  std::fs::write(seed.join(file), content)?;
  git(seed, &["add", "."])?;
  git(seed, &["commit", "-m", "Initial commit"])?;
  git(seed, &["remote", "add", "origin", &remote.to_string_lossy()])?;
  git(seed, &["push", "origin", "main"])?;
  Ok(())
}

/// Commit id of `branch` in `repo`, if it exists
pub fn branch_commit(repo: &Path, branch: &str) -> Result<Option<String>> {
  let output = Command::new("git")
    .current_dir(repo)
    .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    return Ok(None);
  }
  Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the release-automation binary
///
/// Does not fail on a non-zero exit; callers assert on the status.
/// `path_override` replaces PATH (used to shadow git).
pub fn run_release(cwd: &Path, home: &Path, args: &[&str], path_override: Option<&Path>) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-automation");

  let mut cmd = Command::new(bin);
  cmd
    .current_dir(cwd)
    .args(args)
    .env("HOME", home)
    .env("GIT_AUTHOR_NAME", "Release Bot")
    .env("GIT_AUTHOR_EMAIL", "release-bot@example.com")
    .env("GIT_COMMITTER_NAME", "Release Bot")
    .env("GIT_COMMITTER_EMAIL", "release-bot@example.com");
  if let Some(path) = path_override {
    cmd.env("PATH", path);
  }

  cmd.output().context("Failed to run release-automation")
}

/// Directory holding a `git` stand-in that only touches `marker` when run
#[cfg(unix)]
pub fn fake_git_dir(root: &Path, marker: &Path) -> Result<PathBuf> {
  use std::os::unix::fs::PermissionsExt;

  let dir = root.join("fake-bin");
  std::fs::create_dir_all(&dir)?;
  let script = dir.join("git");
  std::fs::write(
    &script,
    format!("#!/bin/sh\n: > '{}'\nexit 1\n", marker.to_string_lossy()),
  )?;
  std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
  Ok(dir)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
