mod cli_logger;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;
use std::process::ExitCode;

use clickreplay::{Config, EditCommand, FileStore, PlayArgs, dump_file, edit_command, inspect_files, play_command};

use crate::cli_logger::CliLogger;

#[derive(Debug, Parser)]
#[command(name = "clickreplay", version, about = "Record, edit and replay input logs")]
struct Cli {
    /// Config file (missing file means defaults)
    #[arg(long, global = true, default_value = "clickreplay.toml")]
    config: PathBuf,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colours
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode replay files and summarise them
    Inspect {
        #[arg(value_name = "FILE_DIR_OR_GLOB", required = true)]
        patterns: Vec<String>,
    },
    /// Print every event of a replay
    Dump { file: PathBuf },
    #[command(flatten)]
    Edit(EditCommand),
    /// Simulate playback frame by frame
    Play(PlayArgs),
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let logger = CliLogger::new(cli.json, cli.no_color);
    match run(&cli, &logger) {
        Ok(code) => code,
        Err(err) => {
            logger.print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CLICKREPLAY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, logger: &CliLogger) -> Result<ExitCode> {
    let config = Config::load_optional(&cli.config);
    tracing::debug!(?config, "loaded config");

    match &cli.command {
        Command::Inspect { patterns } => {
            let report = inspect_files(&config, patterns)?;
            logger.print_inspection(&report)?;
            if report.failed > 0 {
                logger.print_warning(&format!(
                    "{} of {} replay files failed to decode",
                    report.failed,
                    report.files.len()
                ));
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Dump { file } => {
            logger.print_serialized(&dump_file(file)?)?;
        }
        Command::Edit(command) => {
            let mut store = FileStore::cwd();
            logger.print_serialized(&edit_command(&config, &mut store, command)?)?;
        }
        Command::Play(args) => {
            logger.print_serialized(&play_command(&FileStore::cwd(), args)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
