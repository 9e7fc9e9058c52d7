use std::path::Path;
use std::process::Command;

use crate::error::{DeviceError, Result};
use crate::util::command::CommandRunner;

pub fn mount_device(runner: &dyn CommandRunner, device: &Path, mountpoint: &Path) -> Result<()> {
    let mut cmd = Command::new("mount");
    cmd.arg(device).arg(mountpoint);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(DeviceError::MountFailure(format!(
            "{} failed with exit code {}: {}",
            device.display(),
            output.code,
            output.tail(3)
        ))
        .into());
    }
    Ok(())
}

pub fn unmount_path(runner: &dyn CommandRunner, mountpoint: &Path) -> Result<()> {
    let mut cmd = Command::new("umount");
    cmd.arg(mountpoint);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(DeviceError::UmountFailure(format!(
            "{} failed with exit code {}: {}",
            mountpoint.display(),
            output.code,
            output.tail(3)
        ))
        .into());
    }
    Ok(())
}

pub fn spin_down_device(runner: &dyn CommandRunner, device: &Path) -> Result<()> {
    let mut cmd = Command::new("hdparm");
    cmd.arg("-Y").arg(device);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(DeviceError::SpindownFailure(format!(
            "{} failed with exit code {}",
            device.display(),
            output.code
        ))
        .into());
    }
    Ok(())
}
