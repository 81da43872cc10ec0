//! Artifact store contracts and adapters used by the route materializer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{CatalogueError, CatalogueResult};

/// Whether an artifact is already present at a path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArtifactStatus {
    /// A file exists and must be left alone.
    Exists,
    /// Nothing is there yet.
    Missing,
}

/// Storage service for generated artifacts.
///
/// Probing is separate from writing so idempotence decisions can be tested against
/// [`MemoryArtifactStore`] without touching disk. Implementations must be shareable across rayon
/// workers.
pub trait ArtifactStore: Send + Sync {
    /// Report whether a file exists at `path`.
    fn probe(&self, path: &Path) -> CatalogueResult<ArtifactStatus>;

    /// Create `path` and its parents. Succeeds when the directory already exists.
    fn ensure_dir(&self, path: &Path) -> CatalogueResult<()>;

    /// Write `contents` to `path`, replacing any existing file.
    fn write(&self, path: &Path, contents: &str) -> CatalogueResult<()>;
}

/// Filesystem-backed artifact store.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskArtifactStore;

impl ArtifactStore for DiskArtifactStore {
    fn probe(&self, path: &Path) -> CatalogueResult<ArtifactStatus> {
        match path.try_exists() {
            Ok(true) => Ok(ArtifactStatus::Exists),
            Ok(false) => Ok(ArtifactStatus::Missing),
            Err(err) => Err(CatalogueError::io("inspect", path, err)),
        }
    }

    fn ensure_dir(&self, path: &Path) -> CatalogueResult<()> {
        fs::create_dir_all(path).map_err(|err| CatalogueError::io("create", path, err))
    }

    fn write(&self, path: &Path, contents: &str) -> CatalogueResult<()> {
        fs::write(path, contents).map_err(|err| CatalogueError::io("write", path, err))
    }
}

/// In-memory artifact store keyed by path. Counts writes for idempotence checks.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<Vec<PathBuf>>,
    writes: AtomicUsize,
}

impl MemoryArtifactStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), contents.into());
    }

    /// Contents stored at `path`.
    pub fn read(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Every stored path in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Whether `ensure_dir` was called for `path`.
    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|dir| dir == path)
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn probe(&self, path: &Path) -> CatalogueResult<ArtifactStatus> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(if files.contains_key(path) {
            ArtifactStatus::Exists
        } else {
            ArtifactStatus::Missing
        })
    }

    fn ensure_dir(&self, path: &Path) -> CatalogueResult<()> {
        let mut dirs = self.dirs.lock().unwrap_or_else(PoisonError::into_inner);
        if !dirs.iter().any(|dir| dir == path) {
            dirs.push(path.to_path_buf());
        }
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> CatalogueResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(path, contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_probe_tracks_writes() {
        let store = MemoryArtifactStore::new();
        let store_obj: &dyn ArtifactStore = &store;
        let path = Path::new("pages/tools/semrush.jsx");

        assert_eq!(store_obj.probe(path).expect("probe"), ArtifactStatus::Missing);
        store_obj.write(path, "page").expect("write");
        assert_eq!(store_obj.probe(path).expect("probe"), ArtifactStatus::Exists);
        assert_eq!(store.read(path).as_deref(), Some("page"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn seeded_files_do_not_count_as_writes() {
        let store = MemoryArtifactStore::new();
        store.insert("pages/tools/custom.jsx", "hand edited");
        assert_eq!(store.write_count(), 0);
        assert_eq!(
            store.probe(Path::new("pages/tools/custom.jsx")).expect("probe"),
            ArtifactStatus::Exists
        );
    }

    #[test]
    fn disk_store_creates_dirs_and_reports_status() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = DiskArtifactStore;
        let dir = temp.path().join("nested/output");
        store.ensure_dir(&dir).expect("ensure dir");
        store.ensure_dir(&dir).expect("ensure dir twice");
        assert!(dir.is_dir());

        let file = dir.join("page.jsx");
        assert_eq!(store.probe(&file).expect("probe"), ArtifactStatus::Missing);
        store.write(&file, "x").expect("write");
        assert_eq!(store.probe(&file).expect("probe"), ArtifactStatus::Exists);
    }

    #[test]
    fn disk_store_write_into_missing_dir_fails_with_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("absent/page.jsx");
        let err = DiskArtifactStore.write(&file, "x").expect_err("missing parent");
        assert!(err.to_string().contains("page.jsx"));
    }
}
