//! Release descriptor written into the configuration repository
//!
//! # Layout
//!
//! ```text
//! <config repo>/[<descriptor.directory>/]<project>_<version>[_<suffix>].json
//! ```
//!
//! The record is written with four-space indentation and keys in declaration
//! order, followed by a newline.

use crate::core::error::{ReleaseError, ReleaseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default value of the `release` field
pub const RELEASE_LABEL: &str = "automation-delivery";

/// Branch/commit pin for one deployable artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEntry {
  pub name: String,
  pub branch: String,
  pub commit: String,
}

/// Record committed to the configuration repository for one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
  pub release: String,
  pub project: String,
  pub source: Vec<String>,
  pub deploy: Vec<DeploymentEntry>,
  pub repositories: Vec<String>,
}

/// `{source_branch}-v{version}`
pub fn release_branch_name(source_branch: &str, version: &str) -> String {
  format!("{}-v{}", source_branch, version)
}

/// `{project}_{version}.json`, or `{project}_{version}_{suffix}.json`
pub fn descriptor_file_name(project: &str, version: &str, suffix: Option<&str>) -> String {
  match suffix.filter(|s| !s.is_empty()) {
    Some(suffix) => format!("{}_{}_{}.json", project, version, suffix),
    None => format!("{}_{}.json", project, version),
  }
}

impl ReleaseRecord {
  /// Serialize with 4-space indentation
  pub fn to_json(&self) -> ReleaseResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    self.serialize(&mut ser)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| ReleaseError::message(format!("UTF-8 conversion error: {}", e)))
  }
}

/// Write `record` to `path`, creating parent directories and replacing any existing file
pub fn write_release_descriptor(path: &Path, record: &ReleaseRecord) -> ReleaseResult<()> {
  let json = record.to_json()?;

  let io_err = |source| ReleaseError::Descriptor {
    path: path.to_path_buf(),
    source,
  };

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  fs::write(path, json).map_err(io_err)?;

  Ok(())
}
