use tracing::{info, warn};

use crate::config::model::{Destination, RuntimeConfig};
use crate::error::Result;
use crate::notify::{DEVICE_WARNING, OFFSITE_BACKUP};
use crate::scheduler::{mirror_storages, report_failure, take_snapshot, BackupReport, Services};
use crate::snapshot::SnapshotManager;
use crate::util::paths::ensure_dir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffsiteOutcome {
    /// The disk disappeared during the settle delay.
    Aborted,
    Completed(BackupReport),
}

/// Ad-hoc backup onto a freshly attached offsite disk. Its snapshots are
/// never purged; the media is rotated by hand.
pub fn run_offsite_backup(
    config: &RuntimeConfig,
    offsite: &Destination,
    services: &Services,
) -> Result<OffsiteOutcome> {
    let delays = &config.delays;

    info!("mounting offsite backup drive");
    if let Err(err) = services.devices.mount(&offsite.volume, &offsite.mount_point) {
        report_failure(services.notifier, DEVICE_WARNING, &err);
    }
    services.notifier.notify(
        OFFSITE_BACKUP,
        "An external disk for off-site backups has been detected. Backup process will begin shortly.",
    );
    services.sleeper.sleep(delays.mount_settle);
    if !services.devices.is_present(&offsite.volume) {
        services
            .notifier
            .notify(OFFSITE_BACKUP, "Aborted. Disk had been turned off.");
        return Ok(OffsiteOutcome::Aborted);
    }

    let backup_root = offsite.backup_root();
    ensure_dir(&backup_root, services.run_mode)?;

    let storages = mirror_storages(config, offsite, services)?;

    let now = services.clock.now();
    let snapshots = SnapshotManager::new(services.runner, offsite);
    let snapshot = take_snapshot(&snapshots, &backup_root, now, services.notifier);

    services.sleeper.sleep(delays.offsite_flush);
    info!("unmounting offsite backup drive");
    if let Err(err) = services.devices.unmount(&offsite.mount_point) {
        report_failure(services.notifier, DEVICE_WARNING, &err);
    }
    services.sleeper.sleep(delays.unmount_settle);
    for err in services.devices.spin_down(&[offsite.volume.device_path()]) {
        warn!("{}", err);
    }

    Ok(OffsiteOutcome::Completed(BackupReport {
        storages,
        snapshot,
        purged: Vec::new(),
    }))
}
