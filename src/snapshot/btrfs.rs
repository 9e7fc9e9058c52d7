use std::path::Path;
use std::process::Command;

use crate::error::{Result, SnapshotError};
use crate::util::command::CommandRunner;

pub fn create_readonly_snapshot(
    runner: &dyn CommandRunner,
    source: &Path,
    snapshot: &Path,
) -> Result<()> {
    let mut cmd = Command::new("btrfs");
    cmd.arg("subvolume")
        .arg("snapshot")
        .arg("-r")
        .arg(source)
        .arg(snapshot);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(SnapshotError::Command(format!(
            "create {} failed with exit code {}: {}",
            snapshot.display(),
            output.code,
            output.tail(3)
        ))
        .into());
    }
    Ok(())
}

pub fn delete_snapshot(runner: &dyn CommandRunner, snapshot: &Path) -> Result<()> {
    let mut cmd = Command::new("btrfs");
    cmd.arg("subvolume").arg("delete").arg(snapshot);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(SnapshotError::Command(format!(
            "delete {} failed with exit code {}: {}",
            snapshot.display(),
            output.code,
            output.tail(3)
        ))
        .into());
    }
    Ok(())
}

/// Raw `btrfs subvolume list -o` output for the subvolumes below `root`.
pub fn list_subvolumes(runner: &dyn CommandRunner, root: &Path) -> Result<String> {
    let mut cmd = Command::new("btrfs");
    cmd.arg("subvolume").arg("list").arg("-o").arg(root);
    let output = runner.run(&mut cmd)?;
    if !output.success() {
        return Err(SnapshotError::List(format!(
            "{} exited with code {}: {}",
            root.display(),
            output.code,
            output.tail(3)
        ))
        .into());
    }
    Ok(output.stdout)
}

/// Extracts the final path component from each listing line of the form
/// `ID 257 gen 12 top level 5 path Backups/20250101-170000`.
pub fn parse_subvolume_names(listing: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for line in listing.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let path = line
            .split_once(" path ")
            .map(|(_, path)| path.trim())
            .filter(|path| !path.is_empty())
            .ok_or_else(|| SnapshotError::Parse(line.to_string()))?;
        let name = path.rsplit('/').next().unwrap_or(path);
        names.push(name.to_string());
    }
    Ok(names)
}
