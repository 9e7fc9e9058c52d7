use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{BackuperError, Result};

/// Held for the life of the daemon; removes the pid file on drop.
#[derive(Debug)]
pub struct PidLock {
    path: PathBuf,
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = unlock_file(&self.path);
    }
}

pub fn lock_pid_file(path: &Path) -> Result<PidLock> {
    let failed = |e: io::Error| {
        BackuperError::message(format!("failed to lock {}: {}", path.display(), e))
    };
    match claim(path).map_err(failed)? {
        Claim::Acquired => Ok(PidLock {
            path: path.to_path_buf(),
        }),
        Claim::Running(pid) => Err(BackuperError::message(format!(
            "backuper is already running as pid {} (lock {})",
            pid,
            path.display()
        ))),
        Claim::Contended => Err(BackuperError::message(format!(
            "lock {} keeps changing hands, giving up",
            path.display()
        ))),
    }
}

enum Claim {
    Acquired,
    Running(u32),
    Contended,
}

/// Owner recorded in an existing pid file, if that process is still alive.
/// `Ok(None)` covers a vanished, unreadable or dead holder.
fn live_holder(path: &Path) -> io::Result<Option<u32>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    Ok(text
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| Path::new("/proc").join(pid.to_string()).exists()))
}

fn claim(path: &Path) -> io::Result<Claim> {
    const ATTEMPTS: usize = 3;
    for _ in 0..ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                return Ok(Claim::Acquired);
            }
            Err(err) if err.kind() != io::ErrorKind::AlreadyExists => return Err(err),
            Err(_) => {}
        }
        if let Some(pid) = live_holder(path)? {
            return Ok(Claim::Running(pid));
        }
        if let Err(err) = fs::remove_file(path) {
            if err.kind() != io::ErrorKind::NotFound {
                return Err(err);
            }
        }
    }
    Ok(Claim::Contended)
}

fn unlock_file(path: &Path) -> io::Result<()> {
    let pid = fs::read_to_string(path).ok();
    if let Some(pid) = pid {
        if pid.trim() == std::process::id().to_string() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
