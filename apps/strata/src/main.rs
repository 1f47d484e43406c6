//! # Strata
//!
//! Installs layered standards profiles into a project.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use strata::cli::{self, CliResult, InstallContext};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strata", version, about = "Install layered standards profiles into a project")]
struct Cli {
    /// Directory holding config.yml, profiles/ and commands/
    #[arg(long, global = true, env = "STRATA_HOME")]
    base_dir: Option<PathBuf>,

    /// Project to install into
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Log every copied file and resolved parent
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a profile and install its standards and commands
    Install {
        /// Profile to install (defaults to default_profile in config.yml)
        #[arg(long)]
        profile: Option<String>,

        /// Only install commands, leave standards untouched
        #[arg(long)]
        commands_only: bool,

        /// Print the install report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a profile's inheritance chain, base first
    Resolve {
        #[arg(long)]
        profile: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List available profiles
    Profiles {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Cli) -> CliResult<()> {
    let base_dir = cli::default_base_dir(args.base_dir.as_deref())?;
    let ctx = InstallContext::new(base_dir, args.project_dir);

    match args.command {
        Command::Install {
            profile,
            commands_only,
            json,
        } => cli::cmd_install(&ctx, profile.as_deref(), commands_only, json).map(|_| ()),
        Command::Resolve { profile, json } => {
            cli::cmd_resolve(&ctx, profile.as_deref(), json).map(|_| ())
        }
        Command::Profiles { json } => cli::cmd_profiles(&ctx, json).map(|_| ()),
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}
