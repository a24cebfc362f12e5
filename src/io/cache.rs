//! Memoized table loading keyed by `(path, modification time)`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::LoadError;

struct CacheEntry<T> {
    path: PathBuf,
    modified: SystemTime,
    value: Arc<T>,
}

/// Holds the last table loaded from one file.
///
/// A cached value is reused only while the path and mtime both match. If the
/// mtime cannot be read the file is always reloaded.
pub struct FileCache<T> {
    entry: Option<CacheEntry<T>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce(&Path) -> Result<T, LoadError>,
    {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();

        if let (Some(entry), Some(modified)) = (&self.entry, modified) {
            if entry.path == path && entry.modified == modified {
                return Ok(Arc::clone(&entry.value));
            }
        }

        log::debug!("cache miss for '{}'", path.display());
        let value = Arc::new(load(path)?);
        self.entry = modified.map(|modified| CacheEntry {
            path: path.to_path_buf(),
            modified,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    /// Force the next `get_or_load` to hit the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.entry.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn read_len(path: &Path, calls: &Cell<usize>) -> Result<usize, LoadError> {
        calls.set(calls.get() + 1);
        fs::read_to_string(path)
            .map(|s| s.len())
            .map_err(|source| LoadError::Open {
                path: path.to_path_buf(),
                source,
            })
    }

    #[test]
    fn reuses_until_mtime_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");
        fs::write(&path, "abc").unwrap();

        let calls = Cell::new(0);
        let mut cache = FileCache::new();

        let a = cache.get_or_load(&path, |p| read_len(p, &calls)).unwrap();
        let b = cache.get_or_load(&path, |p| read_len(p, &calls)).unwrap();
        assert_eq!((*a, *b), (3, 3));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);

        fs::write(&path, "abcdef").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();

        let c = cache.get_or_load(&path, |p| read_len(p, &calls)).unwrap();
        assert_eq!(*c, 6);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");
        fs::write(&path, "abc").unwrap();

        let calls = Cell::new(0);
        let mut cache = FileCache::new();
        cache.get_or_load(&path, |p| read_len(p, &calls)).unwrap();
        cache.invalidate();
        assert!(!cache.is_cached());
        cache.get_or_load(&path, |p| read_len(p, &calls)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn load_errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.tsv");

        let calls = Cell::new(0);
        let mut cache: FileCache<usize> = FileCache::new();
        assert!(cache.get_or_load(&path, |p| read_len(p, &calls)).is_err());
        assert!(cache.get_or_load(&path, |p| read_len(p, &calls)).is_err());
        assert_eq!(calls.get(), 2);
        assert!(!cache.is_cached());
    }
}
