use crate::core::descriptor::RELEASE_LABEL;
use crate::core::error::{ConfigError, ReleaseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Settings for release-automation
/// Searched in order: release.toml, .release.toml, .config/release.toml
/// Every table is optional; a missing file means defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseSettings {
  #[serde(default)]
  pub release: ReleaseSection,
  #[serde(default)]
  pub descriptor: DescriptorSettings,
  #[serde(default)]
  pub git: GitSettings,
  #[serde(default)]
  pub commit: CommitSettings,
  #[serde(default)]
  pub workspace: WorkspaceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseSection {
  /// Value of the descriptor's `release` field
  #[serde(default = "default_label")]
  pub label: String,
}

fn default_label() -> String {
  RELEASE_LABEL.to_string()
}

impl Default for ReleaseSection {
  fn default() -> Self {
    Self { label: default_label() }
  }
}

/// Where descriptors land inside the configuration repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorSettings {
  /// Relative directory (default: repository root)
  #[serde(default)]
  pub directory: Option<PathBuf>,
}

/// How git is invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSettings {
  /// Program to execute (default: "git")
  #[serde(default = "default_program")]
  pub program: String,

  /// Remote pushed to in both repositories (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Environment variables forwarded to git; everything else is cleared.
  /// Credentials (SSH agent, askpass) only reach git through this list.
  #[serde(default = "default_env")]
  pub env: Vec<String>,
}

fn default_program() -> String {
  "git".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_env() -> Vec<String> {
  [
    "PATH",
    "HOME",
    "USER",
    "XDG_CONFIG_HOME",
    "SSH_AUTH_SOCK",
    "GIT_SSH",
    "GIT_SSH_COMMAND",
    "GIT_ASKPASS",
    "SSH_ASKPASS",
    "GIT_AUTHOR_NAME",
    "GIT_AUTHOR_EMAIL",
    "GIT_COMMITTER_NAME",
    "GIT_COMMITTER_EMAIL",
    "GIT_CONFIG_GLOBAL",
    "GIT_SSL_CAINFO",
    "SSL_CERT_FILE",
    "SSL_CERT_DIR",
    "HTTPS_PROXY",
    "https_proxy",
    "HTTP_PROXY",
    "http_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
    "SYSTEMROOT",
    "USERPROFILE",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

impl Default for GitSettings {
  fn default() -> Self {
    Self {
      program: default_program(),
      remote: default_remote(),
      env: default_env(),
    }
  }
}

/// Config repository commit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitSettings {
  /// Message template: {project} {version} {branch} {suffix}
  #[serde(default = "default_message")]
  pub message: String,
}

fn default_message() -> String {
  "Add release config for {project} v{version}".to_string()
}

impl Default for CommitSettings {
  fn default() -> Self {
    Self {
      message: default_message(),
    }
  }
}

impl CommitSettings {
  /// Fill the message template
  pub fn render(&self, project: &str, version: &str, branch: &str, suffix: Option<&str>) -> String {
    self
      .message
      .replace("{project}", project)
      .replace("{version}", version)
      .replace("{branch}", branch)
      .replace("{suffix}", suffix.unwrap_or(""))
  }
}

/// Where the per-run workspace is created
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
  /// Parent directory (default: system temp dir)
  #[serde(default)]
  pub root: Option<PathBuf>,
}

impl WorkspaceSettings {
  /// Configured root or the system temp dir
  pub fn root_or_default(&self) -> PathBuf {
    self.root.clone().unwrap_or_else(std::env::temp_dir)
  }
}

impl ReleaseSettings {
  /// Find settings file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load from an explicit file, or search `dir`, or fall back to defaults
  pub fn resolve(explicit: Option<&Path>, dir: &Path) -> ReleaseResult<(Self, Option<PathBuf>)> {
    let path = match explicit {
      Some(path) if !path.exists() => {
        return Err(ConfigError::NotFound {
          path: path.to_path_buf(),
        }
        .into());
      }
      Some(path) => Some(path.to_path_buf()),
      None => Self::find_config_path(dir),
    };

    match path {
      Some(path) => Ok((Self::load_file(&path)?, Some(path))),
      None => Ok((Self::default(), None)),
    }
  }

  /// Load and validate a settings file
  pub fn load_file(path: &Path) -> ReleaseResult<Self> {
    let parse_err = |reason: String| ConfigError::Parse {
      path: path.to_path_buf(),
      reason,
    };

    let content = fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
    let settings = Self::from_toml(&content).map_err(|e| parse_err(e.to_string()))?;
    settings.validate()?;

    Ok(settings)
  }

  /// Parse without validation
  pub fn from_toml(content: &str) -> Result<Self, toml_edit::de::Error> {
    toml_edit::de::from_str(content)
  }

  /// Reject values that cannot produce a working run
  pub fn validate(&self) -> Result<(), ConfigError> {
    let invalid = |field: &str, reason: &str| ConfigError::InvalidField {
      field: field.to_string(),
      reason: reason.to_string(),
    };

    if self.release.label.trim().is_empty() {
      return Err(invalid("release.label", "must not be empty"));
    }
    if self.git.program.trim().is_empty() {
      return Err(invalid("git.program", "must not be empty"));
    }
    if self.git.remote.trim().is_empty() {
      return Err(invalid("git.remote", "must not be empty"));
    }
    if self.commit.message.trim().is_empty() {
      return Err(invalid("commit.message", "must not be empty"));
    }

    if let Some(ref dir) = self.descriptor.directory {
      let escapes = dir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
      if escapes {
        return Err(invalid(
          "descriptor.directory",
          "must be a relative path inside the config repository",
        ));
      }
    }

    Ok(())
  }

  /// Descriptor path relative to the config checkout
  pub fn descriptor_relative_path(&self, file_name: &str) -> PathBuf {
    match self.descriptor.directory {
      Some(ref dir) => dir.join(file_name),
      None => PathBuf::from(file_name),
    }
  }
}
