//! Snapshot storage backends.

use crate::error::{EditorError, Result};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for snapshot files.
const SNAPSHOT_MAGIC: &[u8; 4] = b"SNP\0";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

/// Durable key/value storage for document snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Store `content` under `key`, replacing any previous value.
    fn write(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Read the value under `key`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Snapshot storage in a directory, one file per key.
///
/// File layout: magic, version, u64 length, content, crc32 of content.
pub struct FileSnapshotStore {
    path: PathBuf,

    /// Held for the store's lifetime; dropping it releases the lock.
    _lock: File,

    /// Serializes writers within this process.
    write_guard: Mutex<()>,
}

impl FileSnapshotStore {
    /// Open (creating if needed) a snapshot directory and lock it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;
        let lock = Self::acquire_lock(&path)?;

        tracing::debug!(path = %path.display(), "opened snapshot store");

        Ok(Self {
            path,
            _lock: lock,
            write_guard: Mutex::new(()),
        })
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = File::create(path.join("LOCK"))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| EditorError::Locked)?;
        Ok(lock_file)
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(EditorError::InvalidFormat(format!("Invalid snapshot key: {key:?}")));
        }
        Ok(self.path.join(format!("{key}.snap")))
    }

    fn decode(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut reader = bytes;

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(EditorError::InvalidFormat("Invalid snapshot magic".into()));
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(EditorError::InvalidFormat(format!(
                "Unsupported snapshot version: {}",
                version[0]
            )));
        }

        let mut len_bytes = [0u8; 8];
        reader.read_exact(&mut len_bytes)?;
        let len = u64::from_le_bytes(len_bytes) as usize;
        if len.checked_add(4).map_or(true, |needed| reader.len() < needed) {
            return Err(EditorError::InvalidFormat("Truncated snapshot".into()));
        }

        let mut content = vec![0u8; len];
        reader.read_exact(&mut content)?;

        let mut checksum_bytes = [0u8; 4];
        reader.read_exact(&mut checksum_bytes)?;
        let stored = u32::from_le_bytes(checksum_bytes);
        let computed = crc32fast::hash(&content);
        if stored != computed {
            return Err(EditorError::ChecksumMismatch {
                expected: stored,
                got: computed,
            });
        }

        Ok(content)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        let target = self.key_path(key)?;
        let tmp = target.with_extension("tmp");
        let _guard = self.write_guard.lock();

        let mut file = File::create(&tmp)?;
        file.write_all(SNAPSHOT_MAGIC)?;
        file.write_all(&[SNAPSHOT_VERSION])?;
        file.write_all(&(content.len() as u64).to_le_bytes())?;
        file.write_all(content)?;
        file.write_all(&crc32fast::hash(content).to_le_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Self::decode(&bytes).map(Some)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-process snapshot storage.
#[derive(Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_string(), content.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path().join("snapshots")).unwrap();

        store.write("config_backup", b"{\"events\":{}}").unwrap();
        let content = store.read("config_backup").unwrap().unwrap();
        assert_eq!(content, b"{\"events\":{}}");
        assert!(store.read("worlds_backup").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();

        store.write("lang", b"en").unwrap();
        store.write("lang", b"de").unwrap();
        assert_eq!(store.read("lang").unwrap().unwrap(), b"de");

        assert!(store.remove("lang").unwrap());
        assert!(!store.remove("lang").unwrap());
        assert!(store.read("lang").unwrap().is_none());
    }

    #[test]
    fn test_corruption_detected() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        store.write("config_backup", b"{\"a\":1}").unwrap();

        let file = dir.path().join("config_backup.snap");
        let mut bytes = fs::read(&file).unwrap();
        // Flip a content byte (header is 13 bytes).
        bytes[14] ^= 0xff;
        fs::write(&file, &bytes).unwrap();

        let err = store.read("config_backup").unwrap_err();
        assert!(matches!(err, EditorError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_bad_magic() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("lang.snap"), b"garbage-data-here").unwrap();
        assert!(matches!(store.read("lang"), Err(EditorError::InvalidFormat(_))));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        assert!(store.write("../escape", b"x").is_err());
        assert!(store.write("", b"x").is_err());
    }

    #[test]
    fn test_second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let _first = FileSnapshotStore::open(dir.path()).unwrap();
        let second = FileSnapshotStore::open(dir.path());
        assert!(matches!(second, Err(EditorError::Locked)));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySnapshotStore::new();
        assert!(store.is_empty());
        store.write("k", b"v").unwrap();
        assert_eq!(store.read("k").unwrap().unwrap(), b"v");
        assert_eq!(store.len(), 1);
        assert!(store.remove("k").unwrap());
    }
}
