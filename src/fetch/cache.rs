//! Snapshot cache for raw source payloads.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// On-disk snapshots keyed by source name, written byte-identical to the
/// fetched payload and overwritten on refresh.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    root: PathBuf,
}

impl SnapshotCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    pub fn store(&self, name: &str, bytes: &[u8]) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> PipelineResult<Vec<u8>> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(PipelineError::CacheMiss {
                source_name: name.to_string(),
                path,
            });
        }
        Ok(fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load_round_trip_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache"));

        assert!(!cache.contains("vendors.json"));
        cache.store("vendors.json", b"[{\"id\": 1}]").unwrap();
        assert!(cache.contains("vendors.json"));
        assert_eq!(cache.load("vendors.json").unwrap(), b"[{\"id\": 1}]");
    }

    #[test]
    fn test_store_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache.store("config.js", b"old").unwrap();
        cache.store("config.js", b"new").unwrap();
        assert_eq!(cache.load("config.js").unwrap(), b"new");
    }

    #[test]
    fn test_load_missing_snapshot_is_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        assert!(matches!(
            cache.load("absent.json"),
            Err(PipelineError::CacheMiss { .. })
        ));
    }
}
