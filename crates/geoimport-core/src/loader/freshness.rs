// crates/geoimport-core/src/loader/freshness.rs
//! Freshness Gate: decides whether a local copy of a remote file is stale.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size and modification time advertised by the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteMeta {
    pub size: u64,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreshnessGate {
    force: bool,
}

impl FreshnessGate {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// `false` only when the local file exists, has exactly `remote_size`
    /// bytes and was modified at or after `remote_mtime`.
    ///
    /// Times are compared at whole-second resolution, the resolution of
    /// HTTP `Last-Modified`. With `force` set the answer is always `true`.
    pub fn is_stale(&self, local_path: &Path, remote_size: u64, remote_mtime: SystemTime) -> bool {
        if self.force {
            return true;
        }
        let meta = match fs::metadata(local_path) {
            Ok(m) if m.is_file() => m,
            _ => return true,
        };
        let local_mtime = match meta.modified() {
            Ok(t) => t,
            Err(_) => return true,
        };
        meta.len() != remote_size || unix_secs(local_mtime) < unix_secs(remote_mtime)
    }

    pub fn is_stale_against(&self, local_path: &Path, remote: &RemoteMeta) -> bool {
        self.is_stale(local_path, remote.size, remote.modified)
    }
}

fn unix_secs(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs_f64().ceil() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn local_file(content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf, SystemTime) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countryInfo.txt");
        std::fs::write(&path, content).unwrap();
        let mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        (dir, path, mtime)
    }

    #[test]
    fn equal_size_and_equal_mtime_is_fresh() {
        let (_dir, path, mtime) = local_file(b"0123456789");
        assert!(!FreshnessGate::new(false).is_stale(&path, 10, mtime));
    }

    #[test]
    fn local_one_second_older_is_stale() {
        let (_dir, path, mtime) = local_file(b"0123456789");
        let remote = mtime + Duration::from_secs(1);
        assert!(FreshnessGate::new(false).is_stale(&path, 10, remote));
    }

    #[test]
    fn newer_local_copy_is_fresh() {
        let (_dir, path, mtime) = local_file(b"0123456789");
        let remote = mtime - Duration::from_secs(3600);
        assert!(!FreshnessGate::new(false).is_stale(&path, 10, remote));
    }

    #[test]
    fn size_mismatch_is_stale() {
        let (_dir, path, mtime) = local_file(b"0123456789");
        assert!(FreshnessGate::new(false).is_stale(&path, 11, mtime));
    }

    #[test]
    fn missing_file_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let gate = FreshnessGate::new(false);
        assert!(gate.is_stale(&dir.path().join("absent.txt"), 0, UNIX_EPOCH));
    }

    #[test]
    fn force_always_reports_stale() {
        let (_dir, path, mtime) = local_file(b"0123456789");
        assert!(FreshnessGate::new(true).is_stale(&path, 10, mtime));
    }
}
