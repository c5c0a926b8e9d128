mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{CleanArgs, LaunchArgs, clean_stack, launch_stack};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glance")]
#[command(about = "Launch the viewer stack against a host data directory and tear it down on exit")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    launch: LaunchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove a leftover stack container and generated files from an earlier run
    Clean(CleanArgs),
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

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Some(Commands::Clean(args)) => clean_stack(args).await,
        None => launch_stack(cli.launch).await,
    };

    ExitCode::from(code)
}
