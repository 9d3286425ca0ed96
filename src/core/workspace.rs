//! Per-run scratch directory
//!
//! A `Workspace` owns one directory holding the `target` and `config`
//! checkouts. It is removed when the guard is dropped, so every exit path
//! out of the pipeline cleans up. Removal errors are printed as a warning
//! and never replace the pipeline's own error.

use crate::core::error::{ReleaseError, ReleaseResult};
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collision retries before giving up
const MAX_ATTEMPTS: u32 = 100;

/// Exclusively owned scratch directory, deleted on drop
#[derive(Debug)]
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  /// Create `release-<timestamp>-<pid>[-n]` under `parent`
  pub fn acquire(parent: &Path) -> ReleaseResult<Self> {
    let base = format!("release-{}-{}", Utc::now().format("%Y%m%d%H%M%S"), std::process::id());

    let setup_err = |path: PathBuf, source: io::Error| ReleaseError::Setup { path, source };

    fs::create_dir_all(parent).map_err(|e| setup_err(parent.to_path_buf(), e))?;

    for attempt in 0..MAX_ATTEMPTS {
      let name = if attempt == 0 {
        base.clone()
      } else {
        format!("{}-{}", base, attempt)
      };
      let root = parent.join(name);

      match fs::create_dir(&root) {
        Ok(()) => return Ok(Self { root }),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
        Err(e) => return Err(setup_err(root, e)),
      }
    }

    Err(setup_err(
      parent.join(base),
      io::Error::new(io::ErrorKind::AlreadyExists, "no free workspace name"),
    ))
  }

  pub fn path(&self) -> &Path {
    &self.root
  }

  /// Checkout location of the target repository
  pub fn target_dir(&self) -> PathBuf {
    self.root.join("target")
  }

  /// Checkout location of the configuration repository
  pub fn config_dir(&self) -> PathBuf {
    self.root.join("config")
  }

  /// Remove the directory now
  pub fn release(self) {
    // Drop does the work
  }
}

impl Drop for Workspace {
  fn drop(&mut self) {
    release_workspace(&self.root);
  }
}

/// Recursively delete `path`, reporting failures as a warning only
pub fn release_workspace(path: &Path) {
  match fs::remove_dir_all(path) {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => eprintln!("⚠️  Failed to remove workspace {}: {}", path.display(), e),
  }
}
