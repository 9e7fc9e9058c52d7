use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;

use crate::config::model::{
    BackupTarget, Config, DelayConfig, Delays, Destination, DestinationConfig, NotifyConfig,
    RuntimeConfig, StorageConfig,
};
use crate::error::{ConfigError, Result};
use crate::types::VolumeId;
use crate::util::paths::is_safe_name;

const DEFAULT_LOCK_FILE: &str = "/run/backuper.pid";
/// A century of daily snapshots; anything longer is a typo.
pub const MAX_PURGE_DAYS: u32 = 36_500;

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig> {
    let cfg: Config =
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    parse_runtime(cfg)
}

pub fn check_purge_days(days: u32) -> Result<u32> {
    if days > MAX_PURGE_DAYS {
        return Err(ConfigError::Invalid(format!(
            "purgeDays {} exceeds the maximum of {}",
            days, MAX_PURGE_DAYS
        ))
        .into());
    }
    Ok(days)
}

fn parse_runtime(cfg: Config) -> Result<RuntimeConfig> {
    let backup_at = NaiveTime::parse_from_str(cfg.backup_at.trim(), "%H:%M").map_err(|e| {
        ConfigError::Invalid(format!("backupAt {:?}: expected HH:MM ({})", cfg.backup_at, e))
    })?;
    if cfg.backup_days == 0 {
        return Err(ConfigError::Invalid("backupDays must be at least 1".to_string()).into());
    }
    let purge_days = check_purge_days(cfg.purge_days)?;
    if !is_safe_name(&cfg.backup_dir) {
        return Err(ConfigError::Invalid(format!(
            "backupDir {} must use only letters, digits, '.', '-', '_'",
            cfg.backup_dir
        ))
        .into());
    }

    let local = parse_destination("local", &cfg.local, &cfg.backup_dir)?;
    let offsite = match &cfg.offsite {
        Some(offsite) => Some(parse_destination("offsite", offsite, &cfg.backup_dir)?),
        None => None,
    };
    if let Some(offsite) = &offsite {
        if offsite.mount_point == local.mount_point {
            return Err(ConfigError::Invalid(
                "offsite mountPoint must differ from local mountPoint".to_string(),
            )
            .into());
        }
    }

    if cfg.storages.is_empty() {
        return Err(ConfigError::Invalid("at least one storage is required".to_string()).into());
    }
    let mut targets = Vec::new();
    for storage in cfg.storages {
        let (source, own_excludes) = match storage {
            StorageConfig::Path(source) => (source, Vec::new()),
            StorageConfig::Detailed { source, excludes } => (source, excludes),
        };
        if source.trim().is_empty() {
            return Err(ConfigError::Invalid("storage source path is empty".to_string()).into());
        }
        if !Path::new(&source).is_absolute() {
            return Err(
                ConfigError::Invalid(format!("storage {} must be absolute", source)).into(),
            );
        }
        let mut excludes = cfg.excludes.clone();
        excludes.extend(own_excludes);
        targets.push(BackupTarget { source, excludes });
    }

    Ok(RuntimeConfig {
        backup_at,
        backup_days: cfg.backup_days,
        purge_days,
        local,
        offsite,
        notify: NotifyConfig {
            url: cfg.ntfy_url.filter(|url| !url.trim().is_empty()),
            tags: cfg.ntfy_tags,
        },
        spindown_devices: cfg.spindown_devices.into_iter().map(PathBuf::from).collect(),
        targets,
        delays: parse_delays(&cfg.delays),
        lock_file: PathBuf::from(
            cfg.lock_file
                .unwrap_or_else(|| DEFAULT_LOCK_FILE.to_string()),
        ),
    })
}

fn parse_destination(name: &str, dest: &DestinationConfig, backup_dir: &str) -> Result<Destination> {
    let volume = dest
        .fs_uuid
        .parse::<VolumeId>()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", name, e)))?;
    let mount_point = PathBuf::from(dest.mount_point.trim());
    if !mount_point.is_absolute() {
        return Err(ConfigError::Invalid(format!("{}: mountPoint must be absolute", name)).into());
    }
    if mount_point == Path::new("/") {
        return Err(ConfigError::Invalid(format!("{}: mountPoint must not be /", name)).into());
    }
    Ok(Destination {
        volume,
        mount_point,
        backup_dir: backup_dir.to_string(),
    })
}

fn parse_delays(cfg: &DelayConfig) -> Delays {
    let defaults = Delays::default();
    let secs = |value: Option<u64>, default: Duration| value.map(Duration::from_secs).unwrap_or(default);
    Delays {
        startup: secs(cfg.startup, defaults.startup),
        poll: secs(cfg.poll, defaults.poll),
        mount_settle: secs(cfg.mount_settle, defaults.mount_settle),
        snapshot_settle: secs(cfg.snapshot_settle, defaults.snapshot_settle),
        flush: secs(cfg.flush, defaults.flush),
        unmount_settle: secs(cfg.unmount_settle, defaults.unmount_settle),
        offsite_flush: secs(cfg.offsite_flush, defaults.offsite_flush),
        detach_poll: secs(cfg.detach_poll, defaults.detach_poll),
    }
}
