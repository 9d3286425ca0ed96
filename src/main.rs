mod commands;
mod core;
mod utils;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use commands::RunOptions;
use core::error::{ExitCode, ReleaseError, print_error};
use core::release::ReleaseRequest;
use std::path::PathBuf;

/// Cut a release branch and record it in a configuration repository
#[derive(Parser)]
#[command(name = "release-automation")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
#[command(
  after_help = "Example:\n  release-automation git@repo.com:target.git git@repo.com:config.git develop 1.0.0 afs production"
)]
struct Cli {
  /// Repository that receives the release branch
  target_repo: String,

  /// Repository that receives the release descriptor
  config_repo: String,

  /// Branch the release is cut from
  source_branch: String,

  /// Release version (the branch becomes <source-branch>-v<version>)
  #[arg(id = "release_version", value_name = "VERSION")]
  version: String,

  /// Project name recorded in the descriptor
  project: String,

  /// Optional suffix appended to the descriptor file name
  suffix: Option<String>,

  /// Settings file (defaults to release.toml in the current directory)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Name of the deploy entry (defaults to the suffix, then the project)
  #[arg(long, value_name = "NAME")]
  deploy_name: Option<String>,

  /// Extra source repository to list in the descriptor (repeatable)
  #[arg(long = "source", value_name = "URL")]
  sources: Vec<String>,

  /// Extra repository to list in the descriptor (repeatable)
  #[arg(long = "repository", value_name = "URL")]
  repositories: Vec<String>,

  /// Directory the per-run workspace is created in
  #[arg(long, value_name = "DIR")]
  workspace_root: Option<PathBuf>,

  /// Print the plan without running git or touching the filesystem
  #[arg(long)]
  dry_run: bool,

  /// Print the dry-run plan as JSON
  #[arg(long, requires = "dry_run")]
  json: bool,
}

impl Cli {
  fn into_parts(self) -> (ReleaseRequest, RunOptions) {
    let mut request = ReleaseRequest::new(
      self.target_repo,
      self.config_repo,
      self.source_branch,
      self.version,
      self.project,
      self.suffix,
    );
    request.deploy_name = self.deploy_name;
    request.sources = self.sources;
    request.repositories = self.repositories;

    let options = RunOptions {
      config: self.config,
      workspace_root: self.workspace_root,
      dry_run: self.dry_run,
      json: self.json,
    };

    (request, options)
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      // Argument errors exit 1 (clap defaults to 2)
      let code = match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => ExitCode::Success,
        _ => ExitCode::Failure,
      };
      let _ = err.print();
      std::process::exit(code.as_i32());
    }
  };

  let (request, options) = cli.into_parts();
  if let Err(err) = commands::run_release(request, options) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
