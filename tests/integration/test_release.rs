//! End-to-end runs against local bare repositories

use crate::helpers::{ReleaseFixture, git, stderr, stdout};
use anyhow::Result;

#[test]
fn test_release_cuts_branch_and_records_descriptor() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  let develop = fx.target_branch_commit("develop")?.expect("develop exists");

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "develop", "1.0.0", "afs", "production"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("Release automation completed successfully"));

  // Branch points at the source branch tip
  let released = fx.target_branch_commit("develop-v1.0.0")?;
  assert_eq!(released.as_deref(), Some(develop.as_str()));

  let checkout = fx.checkout_config("config-check")?;
  let content = std::fs::read_to_string(checkout.join("afs_1.0.0_production.json"))?;
  let json: serde_json::Value = serde_json::from_str(&content)?;
  assert_eq!(json["release"], "automation-delivery");
  assert_eq!(json["project"], "afs");
  assert_eq!(json["source"], serde_json::json!([]));
  assert_eq!(json["repositories"], serde_json::json!([]));
  assert_eq!(json["deploy"][0]["name"], "production");
  assert_eq!(json["deploy"][0]["branch"], "develop-v1.0.0");
  assert_eq!(json["deploy"][0]["commit"], develop.as_str());
  assert!(content.starts_with("{\n    \"release\""));
  assert!(content.ends_with("}\n"));

  assert_eq!(fx.config_commit_count()?, 2);
  assert!(fx.workspaces_empty()?);
  Ok(())
}

#[test]
fn test_release_without_suffix() -> Result<()> {
  let fx = ReleaseFixture::new()?;

  let output = fx.run(&[&fx.target_url(), &fx.config_url(), "main", "2.3.4", "billing"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  assert!(fx.target_branch_commit("main-v2.3.4")?.is_some());
  let checkout = fx.checkout_config("config-check")?;
  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(checkout.join("billing_2.3.4.json"))?)?;
  assert_eq!(json["deploy"][0]["name"], "billing");
  Ok(())
}

#[test]
fn test_release_honors_settings_file_and_flags() -> Result<()> {
  let fx = ReleaseFixture::new()?;
  std::fs::write(
    fx.work.join("release.toml"),
    r#"[release]
label = "nightly-delivery"

[descriptor]
directory = "releases"

[commit]
message = "release({project}): {branch}"
"#,
  )?;

  let output = fx.run(&[
    &fx.target_url(),
    &fx.config_url(),
    "develop",
    "1.1.0",
    "afs",
    "--deploy-name",
    "afs-api",
    "--source",
    "git@repo.com:lib.git",
    "--repository",
    "git@repo.com:charts.git",
  ])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("Loaded settings from"));

  let checkout = fx.checkout_config("config-check")?;
  let json: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(checkout.join("releases").join("afs_1.1.0.json"))?)?;
  assert_eq!(json["release"], "nightly-delivery");
  assert_eq!(json["deploy"][0]["name"], "afs-api");
  assert_eq!(json["source"], serde_json::json!(["git@repo.com:lib.git"]));
  assert_eq!(json["repositories"], serde_json::json!(["git@repo.com:charts.git"]));

  let subject = git(&checkout, &["log", "-1", "--format=%s"])?;
  assert_eq!(
    String::from_utf8_lossy(&subject.stdout).trim(),
    "release(afs): develop-v1.1.0"
  );
  Ok(())
}
