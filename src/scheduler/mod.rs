use std::path::Path;

use chrono::{Datelike, NaiveDateTime};
use tracing::{error, info, warn};

use crate::backup::{backup_storage, StorageOutcome};
use crate::config::model::{Destination, RuntimeConfig};
use crate::device::DeviceController;
use crate::error::{BackuperError, Result};
use crate::notify::{Notifier, SERVICE_CRASHED, SNAPSHOT_FAILED};
use crate::scheduler::clock::{Clock, Sleeper};
use crate::scheduler::full::run_full_backup;
use crate::scheduler::offsite::{run_offsite_backup, OffsiteOutcome};
use crate::snapshot::{snapshot_name, SnapshotManager};
use crate::types::{RunMode, VolumeId};
use crate::util::command::CommandRunner;

pub mod clock;
pub mod full;
pub mod offsite;

/// The collaborators a backup run drives. All of them are used from the
/// single scheduler thread, one call at a time.
pub struct Services<'a> {
    pub runner: &'a dyn CommandRunner,
    pub devices: &'a dyn DeviceController,
    pub notifier: &'a dyn Notifier,
    pub clock: &'a dyn Clock,
    pub sleeper: &'a dyn Sleeper,
    pub run_mode: RunMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub storages: Vec<StorageOutcome>,
    pub snapshot: Option<String>,
    pub purged: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub full_backup: bool,
    pub offsite_backup: bool,
}

/// Cadence is anchored to the calendar year, so it restarts every January.
pub fn is_backup_day(day_of_year: u32, backup_days: u32) -> bool {
    backup_days != 0 && day_of_year % backup_days == 0
}

pub struct Scheduler<'a> {
    config: &'a RuntimeConfig,
    services: Services<'a>,
    backup_done_today: bool,
}

impl<'a> Scheduler<'a> {
    /// Starts as if today's backup already ran, so a daemon started after the
    /// scheduled time waits for the next eligible day.
    pub fn new(config: &'a RuntimeConfig, services: Services<'a>) -> Self {
        Self {
            config,
            services,
            backup_done_today: true,
        }
    }

    pub fn backup_done_today(&self) -> bool {
        self.backup_done_today
    }

    /// Polls forever. Returns only when a tick fails, after sending the crash
    /// notification; restarting is left to the service manager.
    pub fn run(&mut self) -> Result<()> {
        info!("started");
        self.services.sleeper.sleep(self.config.delays.startup);
        for err in self.services.devices.spin_down(&self.config.spindown_devices) {
            warn!("{}", err);
        }

        loop {
            if let Err(err) = self.tick() {
                error!("backup service crashed: {}", err);
                self.services.notifier.notify(
                    SERVICE_CRASHED,
                    &format!(
                        "Process exited with error '{}'.\nService needs to be restarted manually.",
                        err
                    ),
                );
                return Err(err);
            }
            self.services.sleeper.sleep(self.config.delays.poll);
        }
    }

    pub fn tick(&mut self) -> Result<TickReport> {
        let config = self.config;
        let mut report = TickReport::default();
        let now = self.services.clock.now();
        let time = now.time();

        if is_backup_day(now.ordinal(), config.backup_days)
            && time >= config.backup_at
            && !self.backup_done_today
        {
            info!("doing full backup");
            self.backup_done_today = true;
            run_full_backup(config, &self.services)?;
            info!("full backup done");
            report.full_backup = true;
        }

        if time < config.backup_at {
            self.backup_done_today = false;
        }

        if let Some(offsite) = &config.offsite {
            if self.services.devices.is_present(&offsite.volume) {
                info!("doing offsite backup");
                match run_offsite_backup(config, offsite, &self.services)? {
                    OffsiteOutcome::Completed(_) => {
                        info!("offsite backup done, the disk can now be detached")
                    }
                    OffsiteOutcome::Aborted => warn!("offsite backup aborted"),
                }
                self.wait_for_detach(&offsite.volume);
                report.offsite_backup = true;
            }
        }

        Ok(report)
    }

    fn wait_for_detach(&self, volume: &VolumeId) {
        while self.services.devices.is_present(volume) {
            self.services.sleeper.sleep(self.config.delays.detach_poll);
        }
        info!("offsite disk {} detached", volume);
    }
}

pub(crate) fn mirror_storages(
    config: &RuntimeConfig,
    destination: &Destination,
    services: &Services,
) -> Result<Vec<StorageOutcome>> {
    let mut outcomes = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        outcomes.push(backup_storage(
            services.runner,
            services.notifier,
            target,
            destination,
            services.run_mode,
        )?);
    }
    Ok(outcomes)
}

pub(crate) fn take_snapshot(
    snapshots: &SnapshotManager,
    source: &Path,
    now: NaiveDateTime,
    notifier: &dyn Notifier,
) -> Option<String> {
    let name = snapshot_name(now);
    match snapshots.create(source, &name) {
        Ok(_) => Some(name),
        Err(err) => {
            report_failure(notifier, SNAPSHOT_FAILED, &err);
            None
        }
    }
}

pub(crate) fn report_failure(notifier: &dyn Notifier, title: &str, err: &BackuperError) {
    warn!("{}", err);
    notifier.notify(title, &err.to_string());
}
