use tracing::info;

use crate::backup::rsync::run_rsync;
use crate::config::model::{BackupTarget, Destination};
use crate::error::Result;
use crate::notify::{Notifier, BACKUP_FAILED, BACKUP_SUCCESSFUL};
use crate::types::RunMode;
use crate::util::command::CommandRunner;
use crate::util::paths::ensure_dir;

pub mod rsync;

const FAILURE_TAIL_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOutcome {
    Mirrored,
    Failed(i32),
}

/// Mirrors one storage into the destination's backup directory and reports
/// the outcome with exactly one notification.
///
/// A non-zero rsync exit is reported, not returned; only failures to create
/// the backup directory or to launch rsync at all come back as errors.
pub fn backup_storage(
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
    target: &BackupTarget,
    destination: &Destination,
    run_mode: RunMode,
) -> Result<StorageOutcome> {
    info!("backing up {:?}", target.source);
    let backup_dir = destination.backup_root();
    ensure_dir(&backup_dir, run_mode)?;

    let output = run_rsync(runner, &target.source, &backup_dir, &target.excludes)?;
    if output.success() {
        notifier.notify(
            BACKUP_SUCCESSFUL,
            &format!("Rsync job for {} completed without errors.", target.source),
        );
        Ok(StorageOutcome::Mirrored)
    } else {
        notifier.notify(
            BACKUP_FAILED,
            &format!(
                "Rsync job for {} returned with error {}.\n{}",
                target.source,
                output.code,
                output.tail(FAILURE_TAIL_LINES)
            ),
        );
        Ok(StorageOutcome::Failed(output.code))
    }
}
