use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEVICE_BY_UUID: &str = "/dev/disk/by-uuid";

/// Filesystem UUID used to find a backup volume under `/dev/disk/by-uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeId(String);

impl VolumeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn device_path(&self) -> PathBuf {
        Path::new(DEVICE_BY_UUID).join(&self.0)
    }
}

impl FromStr for VolumeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("fs-uuid is empty".to_string());
        }
        if s.contains('/') || s == "." || s == ".." {
            return Err(format!("fs-uuid {} must not contain path separators", s));
        }
        Ok(VolumeId(s.to_string()))
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}
