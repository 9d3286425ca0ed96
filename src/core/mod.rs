//! Core engine for release-automation
//!
//! - **config**: Settings file (release.toml) parsing and validation
//! - **descriptor**: Release descriptor model, naming and JSON output
//! - **error**: Error types with phase context and help messages
//! - **plan**: Dry-run plans built from the same op lists the coordinator runs
//! - **release**: The release coordinator (setup → target → config → cleanup)
//! - **vcs**: Git operations behind a substitutable command runner
//! - **workspace**: Per-run scratch directory with guaranteed cleanup

pub mod config;
pub mod descriptor;
pub mod error;
pub mod plan;
pub mod release;
pub mod vcs;
pub mod workspace;
