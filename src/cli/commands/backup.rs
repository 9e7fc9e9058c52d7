use std::path::Path;

use crate::backup::StorageOutcome;
use crate::cli::commands::with_services;
use crate::config::load_config;
use crate::error::Result;
use crate::scheduler::full::run_full_backup;
use crate::scheduler::BackupReport;
use crate::types::RunMode;
use crate::util::lock::lock_pid_file;

pub fn run_backup_command(config_path: &Path, run_mode: RunMode) -> Result<()> {
    let cfg = load_config(config_path)?;
    let _lock = if run_mode.dry_run {
        None
    } else {
        Some(lock_pid_file(&cfg.lock_file)?)
    };
    let report = with_services(&cfg, run_mode, run_mode.dry_run, |services| {
        run_full_backup(&cfg, &services)
    })?;
    print_report(&report);
    Ok(())
}

pub fn print_report(report: &BackupReport) {
    let failed = report
        .storages
        .iter()
        .filter(|outcome| matches!(outcome, StorageOutcome::Failed(_)))
        .count();
    println!(
        "storages: {} mirrored, {} failed",
        report.storages.len() - failed,
        failed
    );
    println!(
        "snapshot: {}",
        report.snapshot.as_deref().unwrap_or("<not created>")
    );
    for name in &report.purged {
        println!("purged: {}", name);
    }
}
