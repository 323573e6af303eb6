mod commands;
mod core;
mod release;

use crate::core::error::{RelError, print_error};
use clap::{Parser, Subcommand};

/// Cut versioned releases with rollback on failure
#[derive(Parser)]
#[command(name = "relcut")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Cut a new release on the current repository
  ///
  /// Validates the worktree and changelog, computes the next version from
  /// the release tags, runs the pre-release scripts, rewrites the
  /// changelog, then commits, tags, and pushes. Intended to run from the
  /// repository root with a token that can push to origin.
  Release {
    /// Access token used to authenticate pushes to the origin remote
    token: String,

    /// Bump the major version ("X" in X.Y.Z) instead of inferring the
    /// bump from the changelog
    #[arg(long)]
    bump_major: bool,
  },
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
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Release { token, bump_major } => commands::run_release(token, bump_major),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RelError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
