pub mod git;
pub mod ops;
pub mod runner;

pub use git::Git;
pub use ops::GitOp;
pub use runner::{CommandRunner, SystemRunner};
