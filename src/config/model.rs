use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::types::VolumeId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_backup_at", rename = "backupAt")]
    pub backup_at: String,
    #[serde(default = "default_backup_days", rename = "backupDays")]
    pub backup_days: u32,
    #[serde(default = "default_purge_days", rename = "purgeDays")]
    pub purge_days: u32,
    #[serde(default = "default_backup_dir", rename = "backupDir")]
    pub backup_dir: String,
    pub local: DestinationConfig,
    #[serde(default)]
    pub offsite: Option<DestinationConfig>,
    #[serde(default, rename = "ntfyUrl")]
    pub ntfy_url: Option<String>,
    #[serde(default = "default_ntfy_tags", rename = "ntfyTags")]
    pub ntfy_tags: String,
    #[serde(default, rename = "spindownDevices")]
    pub spindown_devices: Vec<String>,
    pub storages: Vec<StorageConfig>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub delays: DelayConfig,
    #[serde(default, rename = "lockFile")]
    pub lock_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DestinationConfig {
    #[serde(rename = "fsUuid")]
    pub fs_uuid: String,
    #[serde(rename = "mountPoint")]
    pub mount_point: String,
}

/// A storage entry is either a bare source path or a source with its own excludes.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum StorageConfig {
    Path(String),
    Detailed {
        source: String,
        #[serde(default)]
        excludes: Vec<String>,
    },
}

/// Overrides for the settle delays, in seconds.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DelayConfig {
    pub startup: Option<u64>,
    pub poll: Option<u64>,
    pub mount_settle: Option<u64>,
    pub snapshot_settle: Option<u64>,
    pub flush: Option<u64>,
    pub unmount_settle: Option<u64>,
    pub offsite_flush: Option<u64>,
    pub detach_poll: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTarget {
    pub source: String,
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub volume: VolumeId,
    pub mount_point: PathBuf,
    pub backup_dir: String,
}

impl Destination {
    /// `{mountPoint}/{backupDir}`: mirrors and snapshots live here.
    pub fn backup_root(&self) -> PathBuf {
        self.mount_point.join(&self.backup_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub startup: Duration,
    pub poll: Duration,
    pub mount_settle: Duration,
    pub snapshot_settle: Duration,
    pub flush: Duration,
    pub unmount_settle: Duration,
    pub offsite_flush: Duration,
    pub detach_poll: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            startup: Duration::from_secs(120),
            poll: Duration::from_secs(30),
            mount_settle: Duration::from_secs(30),
            snapshot_settle: Duration::from_secs(10),
            flush: Duration::from_secs(90),
            unmount_settle: Duration::from_secs(30),
            offsite_flush: Duration::from_secs(60),
            detach_poll: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub url: Option<String>,
    pub tags: String,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backup_at: NaiveTime,
    pub backup_days: u32,
    pub purge_days: u32,
    pub local: Destination,
    pub offsite: Option<Destination>,
    pub notify: NotifyConfig,
    pub spindown_devices: Vec<PathBuf>,
    pub targets: Vec<BackupTarget>,
    pub delays: Delays,
    pub lock_file: PathBuf,
}

fn default_backup_at() -> String {
    "17:00".to_string()
}

fn default_backup_days() -> u32 {
    3
}

fn default_purge_days() -> u32 {
    60
}

fn default_backup_dir() -> String {
    "Backups".to_string()
}

fn default_ntfy_tags() -> String {
    "floppy_disk".to_string()
}
