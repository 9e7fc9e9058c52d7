use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackuperError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Device(DeviceError),
    #[error("{0}")]
    Snapshot(SnapshotError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("mount {0}")]
    MountFailure(String),
    #[error("umount {0}")]
    UmountFailure(String),
    #[error("spindown {0}")]
    SpindownFailure(String),
    #[error("device {0} is not connected")]
    NotPresent(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot {0}")]
    Command(String),
    #[error("list snapshots: {0}")]
    List(String),
    #[error("parse snapshot entry {0:?}")]
    Parse(String),
    #[error("retention of {0} day(s) reaches before the supported date range")]
    Retention(u32),
}

pub type Result<T> = std::result::Result<T, BackuperError>;

impl BackuperError {
    pub fn message(msg: impl Into<String>) -> Self {
        BackuperError::Message(msg.into())
    }
}

impl From<DeviceError> for BackuperError {
    fn from(err: DeviceError) -> Self {
        BackuperError::Device(err)
    }
}

impl From<ConfigError> for BackuperError {
    fn from(err: ConfigError) -> Self {
        BackuperError::Config(err)
    }
}

impl From<SnapshotError> for BackuperError {
    fn from(err: SnapshotError) -> Self {
        BackuperError::Snapshot(err)
    }
}
