use std::path::Path;

use crate::cli::args::PurgeArgs;
use crate::config::{check_purge_days, load_config};
use crate::error::Result;
use crate::scheduler::clock::{Clock, SystemClock};
use crate::snapshot::SnapshotManager;
use crate::types::RunMode;
use crate::util::command::SystemRunner;
use crate::util::lock::lock_pid_file;

/// Retention pass against an already mounted local destination.
pub fn run_purge_command(config_path: &Path, args: PurgeArgs, run_mode: RunMode) -> Result<()> {
    let cfg = load_config(config_path)?;
    let days = check_purge_days(args.days.unwrap_or(cfg.purge_days))?;
    let _lock = if run_mode.dry_run {
        None
    } else {
        Some(lock_pid_file(&cfg.lock_file)?)
    };
    let runner = SystemRunner::new(run_mode);
    let snapshots = SnapshotManager::new(&runner, &cfg.local);
    let deleted = snapshots.purge_older_than(SystemClock.now(), days);
    if deleted.is_empty() {
        println!("no snapshots older than {} day(s)", days);
    }
    for name in &deleted {
        println!("purged: {}", name);
    }
    Ok(())
}
