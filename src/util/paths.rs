use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{BackuperError, Result};
use crate::types::RunMode;

pub fn is_safe_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Creates `path` and its parents unless it already exists as a directory.
pub fn ensure_dir(path: &Path, run_mode: RunMode) -> Result<()> {
    if path.exists() {
        let meta = fs::metadata(path)
            .map_err(|e| BackuperError::message(format!("stat {}: {}", path.display(), e)))?;
        if !meta.is_dir() {
            return Err(BackuperError::message(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        return Ok(());
    }
    if run_mode.dry_run {
        info!("dry-run: mkdir -p {}", path.display());
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(|e| BackuperError::message(format!("create {}: {}", path.display(), e)))?;
    Ok(())
}
