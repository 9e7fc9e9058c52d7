use std::path::Path;

use tracing::info;

use crate::cli::commands::with_services;
use crate::config::load_config;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::types::RunMode;
use crate::util::lock::lock_pid_file;

pub fn run_daemon(config_path: &Path, run_mode: RunMode) -> Result<()> {
    let cfg = load_config(config_path)?;
    info!(
        "loaded config {} with {} storage(s)",
        config_path.display(),
        cfg.targets.len()
    );
    let _lock = if run_mode.dry_run {
        None
    } else {
        Some(lock_pid_file(&cfg.lock_file)?)
    };
    with_services(&cfg, run_mode, false, |services| {
        Scheduler::new(&cfg, services).run()
    })
}
