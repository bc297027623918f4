use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use logarchive::cli::{
    handle_history_command, handle_inspect_command, handle_list_command, handle_run_command,
    HistoryArgs, InspectArgs, ListArgs, RunArgs,
};
use logarchive::error::{ArchiveError, EXIT_FAILURE};

#[derive(Parser)]
#[command(
    name = "logarchive",
    version,
    about = "Archive aging log files into compressed bundles",
    long_about = "logarchive moves log files older than a retention window into \
                  timestamped .tar.gz bundles, records every run in an append-only \
                  log, and prunes bundles past their own retention window. It is \
                  meant to be invoked by a scheduler such as cron."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one archival pass
    Run(RunArgs),

    /// List bundles in a destination directory
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the files inside a bundle
    Inspect(InspectArgs),

    /// Show recent runs from the run log
    History(HistoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<ArchiveError>()
                .map(ArchiveError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            ExitCode::from(code)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => {
            handle_run_command(args)?;
        }
        Commands::List(args) => handle_list_command(args)?,
        Commands::Inspect(args) => handle_inspect_command(args)?,
        Commands::History(args) => handle_history_command(args)?,
    }

    Ok(())
}
