mod changes;
mod checks;
mod commands;
mod core;
mod dispatch;
mod graph;
mod runner;
mod ui;
mod utils;
mod workspace;

use crate::changes::{ChangeMode, ChangeSourceConfig};
use crate::core::context::WorkspaceContext;
use crate::core::error::{GateError, GateResult, ResultExt, print_error};
use crate::core::vcs::SystemGit;
use crate::dispatch::CiOptions;
use crate::ui::OutputMode;
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Detect which monorepo apps and packages a change affects, and run their CI gates
#[derive(Parser)]
#[command(name = "affected-ci")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Monorepo root (default: the git work tree containing the current directory)
  #[arg(long, global = true, value_name = "DIR")]
  root: Option<PathBuf>,

  /// Print diagnostics to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Disable colored output (also honors NO_COLOR)
  #[arg(long, global = true)]
  no_color: bool,

  /// Continuous-integration marker; only the exact value "true" enables CI mode
  #[arg(long = "ci-env", env = "CI", global = true, hide = true)]
  ci_env: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

impl Cli {
  fn is_ci(&self) -> bool {
    self.ci_env.as_deref() == Some("true")
  }
}

/// How the changed-file list is obtained
#[derive(Args, Clone, Debug)]
struct ChangeArgs {
  /// Change detection mode: staged, pr or range
  #[arg(long, env = "AFFECTED_MODE", default_value = "staged")]
  mode: String,

  /// Base branch for pr mode (diffed as origin/<ref>)
  #[arg(long, env = "BASE_REF")]
  base_ref: Option<String>,

  /// Base revision for range mode (all zeros: every tracked file)
  #[arg(long, env = "BASE_SHA")]
  base_sha: Option<String>,

  /// Head revision for pr and range modes
  #[arg(long, env = "HEAD_SHA")]
  head_sha: Option<String>,
}

impl ChangeArgs {
  fn into_config(self) -> GateResult<ChangeSourceConfig> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    Ok(ChangeSourceConfig {
      mode: ChangeMode::parse(&self.mode)?,
      base_ref: non_empty(self.base_ref),
      base_sha: non_empty(self.base_sha),
      head_sha: non_empty(self.head_sha),
    })
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Show which apps and packages the change affects
  Affected {
    #[command(flatten)]
    changes: ChangeArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = commands::OutputFormat::Json)]
    format: commands::OutputFormat,
  },

  /// Run CI tasks for affected workspaces
  Ci {
    #[command(flatten)]
    changes: ChangeArgs,
    /// Run only the project-level tasks
    #[arg(long)]
    project_only: bool,
    /// Run only the app group
    #[arg(long)]
    apps_only: bool,
    /// Run only the package group
    #[arg(long)]
    packages_only: bool,
    /// Run every workspace in the selected groups regardless of changes
    #[arg(long)]
    force_full_ci: bool,
  },

  /// Validate workspace manifests against the CI contract
  Contract {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run one task for every affected app
  Run {
    /// Task (script) name, e.g. lint or type-check
    task: String,
    #[command(flatten)]
    changes: ChangeArgs,
  },

  /// Print changed project-level files as a JSON array
  ProjectFiles {
    #[command(flatten)]
    changes: ChangeArgs,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
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

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("affected_ci=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("affected_ci=warn"))
  };

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let is_ci = cli.is_ci();
  let stdout_is_terminal = std::io::stdout().is_terminal();
  let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
  ui::style::set_color_enabled(!no_color && (is_ci || stdout_is_terminal));
  ui::install_signal_handler();

  let root = match resolve_root(cli.root.clone()) {
    Ok(root) => root,
    Err(err) => handle_error(err),
  };

  // Inventory and graph are loaded once; every command reads the same snapshot
  let ctx = match WorkspaceContext::build(&root) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };

  let result = match cli.command {
    Commands::Affected { changes, format } => {
      changes.into_config().and_then(|c| commands::run_affected(&ctx, &c, format))
    }
    Commands::Ci {
      changes,
      project_only,
      apps_only,
      packages_only,
      force_full_ci,
    } => changes.into_config().and_then(|c| {
      let options = CiOptions {
        project_only,
        apps_only,
        packages_only,
        force_full: force_full_ci,
        is_ci,
      };
      commands::run_ci(&ctx, &c, options)
    }),
    Commands::Contract { json } => commands::run_contract(&ctx, json),
    Commands::Run { task, changes } => changes.into_config().and_then(|c| {
      let mode = OutputMode::detect(is_ci, stdout_is_terminal);
      commands::run_task(&ctx, &c, &task, mode)
    }),
    Commands::ProjectFiles { changes } => {
      changes.into_config().and_then(|c| commands::run_project_files(&ctx, &c))
    }
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: GateError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

/// The git work tree containing `root` (or the current directory), else the directory itself
fn resolve_root(root: Option<PathBuf>) -> GateResult<PathBuf> {
  let start = match root {
    Some(root) => root,
    None => std::env::current_dir().context("Failed to get current directory")?,
  };

  match SystemGit::open(&start) {
    Ok(git) => Ok(git.work_tree().to_path_buf()),
    Err(err) => {
      tracing::debug!("{} is not inside a git work tree ({}), using it as the root", start.display(), err);
      Ok(start)
    }
  }
}
