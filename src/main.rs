mod commands;
mod core;
mod release;

use clap::Parser;
use crate::core::config::{CliOverrides, Stack};
use crate::core::error::{ReleaseError, print_error};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Tag the current commit with the project version, push the tag, and publish
#[derive(Parser)]
#[command(name = "tagrelease")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Deployment stack (accepted for compatibility; has no effect)
  #[arg(value_enum)]
  stack: Option<Stack>,

  /// Release even if tracked files have uncommitted changes
  #[arg(short, long)]
  force: bool,

  /// Use this version instead of reading it from the descriptor
  #[arg(long, value_name = "VERSION")]
  release_version: Option<String>,

  /// Project descriptor to read the version from (default: pom.xml)
  #[arg(long, value_name = "PATH", conflicts_with = "release_version")]
  descriptor: Option<PathBuf>,

  /// Prefix for the tag name, e.g. "v"
  #[arg(long, value_name = "PREFIX")]
  tag_prefix: Option<String>,

  /// Remote to push the tag to (default: origin)
  #[arg(long)]
  remote: Option<String>,

  /// Check and resolve only; show the plan without tagging or publishing
  #[arg(long)]
  dry_run: bool,

  /// Output the dry-run plan as JSON
  #[arg(long, requires = "dry_run")]
  json: bool,

  /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
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

fn init_tracing(verbose: u8) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::new(match verbose {
      0 => "warn",
      1 => "info",
      _ => "debug",
    })
  });

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let overrides = CliOverrides {
    stack: cli.stack,
    force: cli.force,
    version: cli.release_version,
    descriptor: cli.descriptor,
    tag_prefix: cli.tag_prefix,
    remote: cli.remote,
    dry_run: cli.dry_run,
  };

  if let Err(err) = commands::run_release(overrides, cli.json) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code());
}
