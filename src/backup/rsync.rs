use std::path::Path;
use std::process::Command;

use crate::error::Result;
use crate::util::command::{CommandOutput, CommandRunner};

/// Mirrors `source` into `backup_dir`, deleting files that no longer exist in
/// the source. The tree lands under the source's basename.
pub fn run_rsync(
    runner: &dyn CommandRunner,
    source: &str,
    backup_dir: &Path,
    excludes: &[String],
) -> Result<CommandOutput> {
    let mut cmd = Command::new("rsync");
    cmd.arg("-aq").arg("--delete");
    for exclude in excludes {
        cmd.arg("--exclude").arg(exclude);
    }
    cmd.arg(source).arg(backup_dir);
    runner.run(&mut cmd)
}
