use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use tracing::{info, warn};

use crate::config::model::Destination;
use crate::error::{Result, SnapshotError};
use crate::snapshot::btrfs::{
    create_readonly_snapshot, delete_snapshot, list_subvolumes, parse_subvolume_names,
};
use crate::util::command::CommandRunner;

pub mod btrfs;

/// Snapshot names are local timestamps; retention parses them back.
pub const SNAPSHOT_NAME_FORMAT: &str = "%Y%m%d-%H%M%S";

pub fn snapshot_name(at: NaiveDateTime) -> String {
    at.format(SNAPSHOT_NAME_FORMAT).to_string()
}

pub fn parse_snapshot_name(name: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(name, SNAPSHOT_NAME_FORMAT)
        .map_err(|_| SnapshotError::Parse(name.to_string()).into())
}

pub fn retention_cutoff(now: NaiveDateTime, days: u32) -> Result<NaiveDateTime> {
    Duration::try_days(i64::from(days))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| SnapshotError::Retention(days).into())
}

pub fn is_expired(name: &str, cutoff: NaiveDateTime) -> Result<bool> {
    Ok(parse_snapshot_name(name)? < cutoff)
}

/// Snapshots of one destination, stored as `{mountPoint}/{backupDir}/{name}`.
pub struct SnapshotManager<'a> {
    runner: &'a dyn CommandRunner,
    root: PathBuf,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, destination: &Destination) -> Self {
        Self {
            runner,
            root: destination.backup_root(),
        }
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create(&self, source: &Path, name: &str) -> Result<PathBuf> {
        let snapshot = self.snapshot_path(name);
        info!("making snapshot {}", name);
        create_readonly_snapshot(self.runner, source, &snapshot)?;
        Ok(snapshot)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        let listing = list_subvolumes(self.runner, &self.root)?;
        parse_subvolume_names(&listing)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        info!("removing snapshot {}", name);
        delete_snapshot(self.runner, &self.snapshot_path(name))
    }

    /// Deletes every snapshot whose name encodes a time before `now - days`.
    ///
    /// An out-of-range cutoff, or the first listing or parse error, abandons
    /// the rest of the pass; the error is logged and the snapshots already
    /// removed are returned.
    pub fn purge_older_than(&self, now: NaiveDateTime, days: u32) -> Vec<String> {
        let mut deleted = Vec::new();
        if let Err(err) = self.try_purge(now, days, &mut deleted) {
            warn!("error occurred while managing old snapshots: {}", err);
        }
        deleted
    }

    fn try_purge(&self, now: NaiveDateTime, days: u32, deleted: &mut Vec<String>) -> Result<()> {
        let cutoff = retention_cutoff(now, days)?;
        for name in self.list()? {
            if !is_expired(&name, cutoff)? {
                continue;
            }
            match self.delete(&name) {
                Ok(()) => deleted.push(name),
                Err(err) => warn!("{}", err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackuperError;
    use crate::testing::ScriptedRunner;
    use crate::util::command::CommandOutput;
    use chrono::{NaiveDate, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn local() -> Destination {
        Destination {
            volume: "uuid-1".parse().unwrap(),
            mount_point: PathBuf::from("/backups"),
            backup_dir: "Backups".to_string(),
        }
    }

    fn listing(names: &[&str]) -> String {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("ID {} gen 9 top level 256 path Backups/{}\n", 300 + i, name))
            .collect()
    }

    #[test]
    fn snapshot_name_format() {
        assert_eq!(snapshot_name(at(2025, 3, 7, 17, 0, 5)), "20250307-170005");
    }

    #[test]
    fn snapshot_name_roundtrips_to_the_second() {
        let samples = [
            at(2024, 2, 29, 23, 59, 59),
            at(2025, 1, 1, 0, 0, 0),
            at(1999, 12, 31, 12, 34, 56),
        ];
        for sample in samples {
            let parsed = parse_snapshot_name(&snapshot_name(sample)).unwrap();
            assert_eq!(parsed, sample);
        }
        let with_nanos = at(2025, 6, 1, 8, 15, 30).with_nanosecond(123_456_789).unwrap();
        let parsed = parse_snapshot_name(&snapshot_name(with_nanos)).unwrap();
        assert_eq!(parsed, at(2025, 6, 1, 8, 15, 30));
    }

    #[test]
    fn rejects_foreign_names() {
        assert!(parse_snapshot_name("Backups").is_err());
        assert!(parse_snapshot_name("2025-01-01").is_err());
        assert!(parse_snapshot_name("20251301-000000").is_err());
    }

    #[test]
    fn create_places_snapshot_under_backup_dir() {
        let runner = ScriptedRunner::default();
        let manager = SnapshotManager::new(&runner, &local());
        let path = manager
            .create(Path::new("/backups/Backups"), "20250307-170005")
            .unwrap();
        assert_eq!(path, PathBuf::from("/backups/Backups/20250307-170005"));
        assert_eq!(
            runner.calls(),
            vec![
                "btrfs subvolume snapshot -r /backups/Backups /backups/Backups/20250307-170005"
                    .to_string()
            ]
        );
    }

    #[test]
    fn create_failure_is_an_error() {
        let runner = ScriptedRunner::default();
        runner.respond("btrfs subvolume snapshot", CommandOutput::failed(1, "ERROR: not a subvolume"));
        let manager = SnapshotManager::new(&runner, &local());
        assert!(manager.create(Path::new("/backups/Backups"), "x").is_err());
    }

    #[test]
    fn purge_removes_exactly_the_expired_set_in_any_order() {
        let now = at(2025, 3, 1, 17, 0, 0);
        // cutoff is 2024-12-31 17:00:00
        let names = [
            "20250101-170000",
            "20241231-165959",
            "20241231-170000",
            "20241101-080000",
            "20250228-170000",
        ];
        let mut expected = vec!["20241231-165959".to_string(), "20241101-080000".to_string()];
        expected.sort();

        let orders: [[usize; 5]; 3] = [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]];
        for order in orders {
            let ordered: Vec<&str> = order.iter().map(|&i| names[i]).collect();
            let runner = ScriptedRunner::default();
            runner.respond("btrfs subvolume list", CommandOutput::with_stdout(&listing(&ordered)));
            let manager = SnapshotManager::new(&runner, &local());

            let mut deleted = manager.purge_older_than(now, 60);
            deleted.sort();
            assert_eq!(deleted, expected);

            let delete_calls: Vec<String> = runner
                .calls()
                .into_iter()
                .filter(|call| call.starts_with("btrfs subvolume delete"))
                .collect();
            assert_eq!(delete_calls.len(), 2);
            assert!(delete_calls
                .iter()
                .all(|call| call.starts_with("btrfs subvolume delete /backups/Backups/")));
        }
    }

    #[test]
    fn purge_lists_below_backup_dir() {
        let runner = ScriptedRunner::default();
        let manager = SnapshotManager::new(&runner, &local());
        manager.purge_older_than(at(2025, 3, 1, 0, 0, 0), 60);
        assert_eq!(
            runner.calls(),
            vec!["btrfs subvolume list -o /backups/Backups".to_string()]
        );
    }

    #[test]
    fn malformed_entry_abandons_rest_of_pass() {
        let now = at(2025, 3, 1, 17, 0, 0);
        let runner = ScriptedRunner::default();
        runner.respond(
            "btrfs subvolume list",
            CommandOutput::with_stdout(&listing(&[
                "20240101-000000",
                "not-a-snapshot",
                "20240102-000000",
            ])),
        );
        let manager = SnapshotManager::new(&runner, &local());

        let deleted = manager.purge_older_than(now, 60);

        assert_eq!(deleted, vec!["20240101-000000".to_string()]);
        assert!(!runner
            .calls()
            .iter()
            .any(|call| call.ends_with("20240102-000000")));
    }

    #[test]
    fn cutoff_outside_date_range_is_an_error() {
        let now = at(2025, 3, 1, 17, 0, 0);
        assert_eq!(retention_cutoff(now, 60).unwrap(), at(2024, 12, 31, 17, 0, 0));
        let err = retention_cutoff(now, 100_000_000).unwrap_err();
        assert!(matches!(err, BackuperError::Snapshot(SnapshotError::Retention(100_000_000))));
    }

    #[test]
    fn huge_retention_skips_the_pass_without_listing() {
        let runner = ScriptedRunner::default();
        runner.respond(
            "btrfs subvolume list",
            CommandOutput::with_stdout(&listing(&["20240101-000000"])),
        );
        let manager = SnapshotManager::new(&runner, &local());

        let deleted = manager.purge_older_than(at(2025, 3, 1, 17, 0, 0), u32::MAX);

        assert!(deleted.is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn listing_failure_deletes_nothing() {
        let runner = ScriptedRunner::default();
        runner.respond("btrfs subvolume list", CommandOutput::failed(1, ""));
        let manager = SnapshotManager::new(&runner, &local());
        assert!(manager.purge_older_than(at(2025, 3, 1, 0, 0, 0), 60).is_empty());
        assert_eq!(runner.calls().len(), 1);
    }
}
