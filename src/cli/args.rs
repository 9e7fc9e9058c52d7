use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "backuper",
    version,
    about = "Scheduled btrfs snapshot backups with hot-plug offsite disk support"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the scheduler loop (default)
    Run,
    /// Run one full backup to the local destination now
    Backup,
    /// Run one offsite backup if the offsite disk is attached
    Offsite,
    /// Remove expired snapshots from the mounted local destination
    Purge(PurgeArgs),
    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PurgeArgs {
    /// Override the configured retention in days
    #[arg(long)]
    pub days: Option<u32>,
}
