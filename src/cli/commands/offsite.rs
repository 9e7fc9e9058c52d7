use std::path::Path;

use crate::cli::commands::backup::print_report;
use crate::cli::commands::with_services;
use crate::config::load_config;
use crate::error::{BackuperError, DeviceError, Result};
use crate::scheduler::offsite::{run_offsite_backup, OffsiteOutcome};
use crate::types::RunMode;
use crate::util::lock::lock_pid_file;

pub fn run_offsite_command(config_path: &Path, run_mode: RunMode) -> Result<()> {
    let cfg = load_config(config_path)?;
    let offsite = cfg
        .offsite
        .as_ref()
        .ok_or_else(|| BackuperError::message("no offsite disk configured"))?;
    let _lock = if run_mode.dry_run {
        None
    } else {
        Some(lock_pid_file(&cfg.lock_file)?)
    };
    let outcome = with_services(&cfg, run_mode, run_mode.dry_run, |services| {
        if !services.devices.is_present(&offsite.volume) {
            return Err(DeviceError::NotPresent(offsite.volume.device_path().display().to_string()).into());
        }
        run_offsite_backup(&cfg, offsite, &services)
    })?;
    match outcome {
        OffsiteOutcome::Completed(report) => {
            print_report(&report);
            println!("offsite disk can now be detached");
        }
        OffsiteOutcome::Aborted => println!("offsite backup aborted: disk disappeared"),
    }
    Ok(())
}
