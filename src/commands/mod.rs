//! CLI commands for release-automation
//!
//! - **release**: Cut the release branch and record it in the config repo
//!   (or print the plan with `--dry-run`)

pub mod release;

pub use release::{RunOptions, run_release};
