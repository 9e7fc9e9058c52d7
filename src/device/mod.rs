pub mod ops;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::device::ops::{mount_device, spin_down_device, unmount_path};
use crate::error::{BackuperError, Result};
use crate::types::VolumeId;
use crate::util::command::CommandRunner;

/// Mount, unmount and power management of the backup disks.
///
/// Callers treat a failed mount or unmount as a reportable event, not a reason
/// to stop: nothing verifies the mount before the backup proceeds.
pub trait DeviceController {
    fn mount(&self, volume: &VolumeId, mountpoint: &Path) -> Result<()>;
    fn unmount(&self, mountpoint: &Path) -> Result<()>;
    /// Spins down every device in order; returns the failures, if any.
    fn spin_down(&self, devices: &[PathBuf]) -> Vec<BackuperError>;
    fn is_present(&self, volume: &VolumeId) -> bool;
}

pub struct SystemDevices<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SystemDevices<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl DeviceController for SystemDevices<'_> {
    fn mount(&self, volume: &VolumeId, mountpoint: &Path) -> Result<()> {
        info!("mounting {} at {}", volume, mountpoint.display());
        mount_device(self.runner, &volume.device_path(), mountpoint)
    }

    fn unmount(&self, mountpoint: &Path) -> Result<()> {
        info!("unmounting {}", mountpoint.display());
        unmount_path(self.runner, mountpoint)
    }

    fn spin_down(&self, devices: &[PathBuf]) -> Vec<BackuperError> {
        let mut failures = Vec::new();
        for device in devices {
            info!("spinning down {}", device.display());
            if let Err(err) = spin_down_device(self.runner, device) {
                warn!("{}", err);
                failures.push(err);
            }
        }
        failures
    }

    fn is_present(&self, volume: &VolumeId) -> bool {
        link_exists(&volume.device_path())
    }
}

/// udev publishes attached filesystems as symlinks. Only the link itself is
/// checked: a dangling link still counts as present, a missing one as gone.
pub fn link_exists(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use crate::util::command::CommandOutput;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn link_presence_follows_symlink() {
        let dir = TempDir::new().expect("tempdir");
        let link = dir.path().join("uuid-1");
        assert!(!link_exists(&link));
        symlink("../../sdz1", &link).expect("symlink");
        assert!(link_exists(&link));
        fs::remove_file(&link).expect("remove");
        assert!(!link_exists(&link));
    }

    #[test]
    fn plain_file_is_not_a_device_link() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("uuid-1");
        fs::write(&file, b"").expect("write");
        assert!(!link_exists(&file));
    }

    #[test]
    fn mount_uses_uuid_device_path() {
        let runner = ScriptedRunner::default();
        let devices = SystemDevices::new(&runner);
        let volume: VolumeId = "uuid-1".parse().unwrap();
        devices.mount(&volume, Path::new("/backups")).expect("mount");
        assert_eq!(
            runner.calls(),
            vec!["mount /dev/disk/by-uuid/uuid-1 /backups".to_string()]
        );
    }

    #[test]
    fn mount_failure_is_reported() {
        let runner = ScriptedRunner::default();
        runner.respond("mount", CommandOutput::failed(32, "mount: wrong fs type"));
        let devices = SystemDevices::new(&runner);
        let volume: VolumeId = "uuid-1".parse().unwrap();
        let err = devices.mount(&volume, Path::new("/backups")).unwrap_err();
        assert!(err.to_string().contains("exit code 32"));
    }

    #[test]
    fn spin_down_continues_after_failure() {
        let runner = ScriptedRunner::default();
        runner.respond("hdparm -Y /dev/sda", CommandOutput::failed(1, ""));
        let devices = SystemDevices::new(&runner);
        let failures = devices.spin_down(&[PathBuf::from("/dev/sda"), PathBuf::from("/dev/sdb")]);
        assert_eq!(failures.len(), 1);
        assert_eq!(
            runner.calls(),
            vec!["hdparm -Y /dev/sda".to_string(), "hdparm -Y /dev/sdb".to_string()]
        );
    }
}
