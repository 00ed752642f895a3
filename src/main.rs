use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use v_and_r::cli::{commands, Context, Options};
use v_and_r::domain::VersionBump;
use v_and_r::error::{VandrError, EXIT_OTHER};
use v_and_r::ui;

#[derive(Parser)]
#[command(
    name = "v-and-r",
    version,
    about = "Manage version strings across project files and prepare releases from git history"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = ".", help = "Project root directory")]
    root: PathBuf,

    #[arg(long, global = true, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short = 'y', long = "yes", global = true, help = "Skip confirmation prompts")]
    yes: bool,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v debug, -vv trace)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the versions found in every configured file
    View,
    /// Increment the patch version in every file
    Patch,
    /// Increment the minor version and reset patch
    Minor,
    /// Increment the major version and reset minor and patch
    Major,
    /// Print release metadata JSON for the current version
    ReleaseInfo,
    /// Show the commits between two version tags
    ReleaseDiff {
        /// Older tag, e.g. v1.2.0
        from: String,
        /// Newer tag, e.g. v1.3.0
        to: String,
    },
    /// Show the latest version tag and its commits
    ReleaseLast,
    /// Write CHANGELOG, release notes and version metadata for the current version
    ReleasePrepare,
    /// Tag HEAD with the current version and push the tag
    ReleaseDeploy {
        #[arg(long, help = "Remote to push to (default from configuration)")]
        remote: Option<String>,

        #[arg(long, help = "Create the tag locally without pushing")]
        no_push: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let options = Options {
        dry_run: args.dry_run,
        assume_yes: args.yes,
    };
    let ctx = Context::load(&args.root, args.config.as_deref(), options)?;

    match args.command {
        Command::View => {
            commands::view(&ctx)?;
        }
        Command::Patch => {
            commands::increment(&ctx, VersionBump::Patch)?;
        }
        Command::Minor => {
            commands::increment(&ctx, VersionBump::Minor)?;
        }
        Command::Major => {
            commands::increment(&ctx, VersionBump::Major)?;
        }
        Command::ReleaseInfo => {
            commands::release_info(&ctx)?;
        }
        Command::ReleaseDiff { from, to } => {
            commands::release_diff(&ctx, &from, &to)?;
        }
        Command::ReleaseLast => {
            commands::release_last(&ctx)?;
        }
        Command::ReleasePrepare => {
            commands::release_prepare(&ctx)?;
        }
        Command::ReleaseDeploy { remote, no_push } => {
            commands::release_deploy(&ctx, remote.as_deref(), !no_push)?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        let code = e
            .downcast_ref::<VandrError>()
            .map(VandrError::exit_code)
            .unwrap_or(EXIT_OTHER);
        ui::display_error(&e.to_string());
        std::process::exit(code);
    }
}
