//! Subprocess capability used by every git call
//!
//! The coordinator never touches `std::process` directly. It hands an
//! `Invocation` to a `CommandRunner`; production uses `SystemRunner`, tests
//! substitute a recording fake.

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// What to do with the child's stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
  /// Child writes straight to our stdout/stderr
  Inherit,
  /// Stdout is collected, stderr stays inherited
  Stdout,
}

/// A single program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  /// Working directory, `None` keeps the process cwd
  pub cwd: Option<PathBuf>,
  pub capture: Capture,
}

/// Result of a finished invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
  /// Exit code, `None` when killed by a signal
  pub code: Option<i32>,
  /// Captured stdout (empty unless `Capture::Stdout`)
  pub stdout: String,
}

impl Outcome {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  /// Human readable exit status
  pub fn status_text(&self) -> String {
    match self.code {
      Some(code) => format!("exit status {}", code),
      None => "terminated by signal".to_string(),
    }
  }
}

/// Capability to execute a program and wait for it
pub trait CommandRunner {
  /// Run to completion. `Err` only when the program could not be started.
  fn execute(&self, invocation: &Invocation) -> io::Result<Outcome>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
  fn execute(&self, invocation: &Invocation) -> io::Result<Outcome> {
    (**self).execute(invocation)
  }
}

/// Runs real subprocesses with an isolated environment
///
/// - Clears environment variables
/// - Forwards only the configured pass-through variables
/// - Blocks until the child exits (no timeout)
pub struct SystemRunner {
  env_passthrough: Vec<String>,
}

impl SystemRunner {
  pub fn new(env_passthrough: Vec<String>) -> Self {
    Self { env_passthrough }
  }

  fn command(&self, invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);

    if let Some(cwd) = &invocation.cwd {
      cmd.current_dir(cwd);
    }

    // Isolated environment (credentials reach git only when listed)
    cmd.env_clear();
    for key in &self.env_passthrough {
      if let Some(value) = std::env::var_os(key) {
        cmd.env(key, value);
      }
    }

    cmd.stdin(Stdio::inherit());
    cmd.stderr(Stdio::inherit());
    match invocation.capture {
      Capture::Inherit => cmd.stdout(Stdio::inherit()),
      Capture::Stdout => cmd.stdout(Stdio::piped()),
    };

    cmd
  }
}

impl CommandRunner for SystemRunner {
  fn execute(&self, invocation: &Invocation) -> io::Result<Outcome> {
    let mut cmd = self.command(invocation);

    match invocation.capture {
      Capture::Inherit => {
        let status = cmd.status()?;
        Ok(Outcome {
          code: status.code(),
          stdout: String::new(),
        })
      }
      Capture::Stdout => {
        let output = cmd.output()?;
        Ok(Outcome {
          code: output.status.code(),
          stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
      }
    }
  }
}
