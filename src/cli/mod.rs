use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{backup, daemon, exit_for_error, offsite, purge, show_config};
use crate::types::RunMode;

pub mod args;
pub mod commands;

const CONFIG_FILE: &str = "/etc/backuper.yaml";
const LOG_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let run_mode = RunMode {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    let command = cli.command.unwrap_or(Command::Run);
    let result = match command {
        Command::Run => daemon::run_daemon(&config_path, run_mode),
        Command::Backup => backup::run_backup_command(&config_path, run_mode),
        Command::Offsite => offsite::run_offsite_command(&config_path, run_mode),
        Command::Purge(args) => purge::run_purge_command(&config_path, args, run_mode),
        Command::Config => show_config(&config_path),
    };
    if let Err(err) = result {
        exit_for_error(&err);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(false)
        .try_init();
}
