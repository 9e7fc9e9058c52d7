use tracing::{info, warn};

use crate::config::model::RuntimeConfig;
use crate::error::Result;
use crate::notify::DEVICE_WARNING;
use crate::scheduler::{mirror_storages, report_failure, take_snapshot, BackupReport, Services};
use crate::snapshot::SnapshotManager;
use crate::util::paths::ensure_dir;

/// Scheduled mirror-and-snapshot run against the local destination,
/// followed by the retention purge and disk spin-down.
pub fn run_full_backup(config: &RuntimeConfig, services: &Services) -> Result<BackupReport> {
    let local = &config.local;
    let delays = &config.delays;

    info!("mounting backup drive");
    if let Err(err) = services.devices.mount(&local.volume, &local.mount_point) {
        report_failure(services.notifier, DEVICE_WARNING, &err);
    }
    services.sleeper.sleep(delays.mount_settle);

    let backup_root = local.backup_root();
    ensure_dir(&backup_root, services.run_mode)?;

    let storages = mirror_storages(config, local, services)?;

    services.sleeper.sleep(delays.snapshot_settle);
    let now = services.clock.now();
    let snapshots = SnapshotManager::new(services.runner, local);
    let snapshot = take_snapshot(&snapshots, &backup_root, now, services.notifier);
    let purged = snapshots.purge_older_than(now, config.purge_days);
    if !purged.is_empty() {
        info!("removed {} expired snapshot(s)", purged.len());
    }

    services.sleeper.sleep(delays.flush);
    info!("unmounting backup drive");
    if let Err(err) = services.devices.unmount(&local.mount_point) {
        report_failure(services.notifier, DEVICE_WARNING, &err);
    }
    services.sleeper.sleep(delays.unmount_settle);
    for err in services.devices.spin_down(&config.spindown_devices) {
        warn!("{}", err);
    }

    Ok(BackupReport {
        storages,
        snapshot,
        purged,
    })
}
