//! Failure paths: exit status, diagnostics and what is left behind

use crate::helpers::{ReleaseFixture, git, stderr};
use anyhow::Result;

#[test]
fn test_missing_source_branch_stops_before_config_repo() -> Result<()> {
  let fx = ReleaseFixture::new()?;

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "feature", "1.0.0", "afs"])?;
  assert_eq!(output.status.code(), Some(1));

  let err = stderr(&output);
  assert!(err.contains("target repo handling failed"), "stderr: {}", err);
  assert!(fx.target_branch_commit("feature-v1.0.0")?.is_none());
  assert_eq!(fx.config_commit_count()?, 1);
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_existing_release_branch_is_not_overwritten() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  git(&fx.target, &["branch", "develop-v1.0.0", "main"])?;
  let before = fx.target_branch_commit("develop-v1.0.0")?;

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "develop", "1.0.0", "afs"])?;
  assert_eq!(output.status.code(), Some(1));

  let err = stderr(&output);
  assert!(err.contains("target repo handling failed"), "stderr: {}", err);
  assert!(err.contains("develop-v1.0.0"));
  assert_eq!(fx.target_branch_commit("develop-v1.0.0")?, before);
  assert_eq!(fx.config_commit_count()?, 1);
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_namespaced_branch_with_same_name_does_not_block_release() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  git(&fx.target, &["branch", "hotfix/develop-v1.0.0", "main"])?;
  git(&fx.target, &["branch", "team/develop-v1.0.0", "main"])?;
  let develop = fx.target_branch_commit("develop")?;

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "develop", "1.0.0", "afs"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  assert_eq!(fx.target_branch_commit("develop-v1.0.0")?, develop);
  assert_eq!(fx.config_commit_count()?, 2);
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_missing_config_repo_reports_pushed_branch() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  let missing = fx.root.join("remotes").join("nope.git");

  let output = fx.run(&[&fx.target_url(), &missing.to_string_lossy(), "develop", "1.0.0", "afs"])?;
  assert_eq!(output.status.code(), Some(1));

  let err = stderr(&output);
  assert!(err.contains("config repo handling failed"), "stderr: {}", err);
  assert!(err.contains("already pushed"));
  // The branch push is not rolled back
  assert!(fx.target_branch_commit("develop-v1.0.0")?.is_some());
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_missing_target_repo_fails_fast() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  let missing = fx.root.join("remotes").join("nope.git");

  let output = fx.run(&[&missing.to_string_lossy(), &fx.config_url(), "develop", "1.0.0", "afs"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("target repo handling failed"));
  assert_eq!(fx.config_commit_count()?, 1);
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_invalid_settings_file_fails_before_git() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  std::fs::write(fx.work.join("release.toml"), "[git]\nunknown_key = true\n")?;

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "develop", "1.0.0", "afs"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("release.toml"));
  assert!(fx.target_branch_commit("develop-v1.0.0")?.is_none());
  Ok(())
}
