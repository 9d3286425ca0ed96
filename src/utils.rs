//! Helpers for repository locations and path display

use std::path::{Path, PathBuf};

/// Filesystem path behind a repository location, or `None` for remotes
///
/// Local:
/// - `/srv/git/app.git`, `./app`, `../app`, `C:\git\app`, `C:/git/app`
/// - `file:///srv/git/app.git`
///
/// Remote:
/// - `git@github.com:org/app.git` (scp-like)
/// - `https://…`, `ssh://…`, `git://…`
/// - bare names such as `app` (ambiguous, left to git)
pub fn local_repo_path(location: &str) -> Option<PathBuf> {
  if let Some(rest) = location.strip_prefix("file://") {
    return Some(PathBuf::from(rest));
  }
  if location.contains("://") {
    return None;
  }

  let bytes = location.as_bytes();
  let drive_letter = bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'\\' | b'/');
  let explicit = location.starts_with('/')
    || location.starts_with("./")
    || location.starts_with("../")
    || location.starts_with("\\\\")
    || drive_letter;

  // scp-like syntax: `user@host:path`
  if !explicit && location.contains('@') {
    return None;
  }

  explicit.then(|| PathBuf::from(location))
}

/// Path rendered with forward slashes, as git prints them
pub fn slash_path(path: &Path) -> String {
  let text = path.to_string_lossy();
  if cfg!(windows) {
    text.replace('\\', "/")
  } else {
    text.into_owned()
  }
}
