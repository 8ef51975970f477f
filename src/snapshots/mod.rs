//! Durable snapshots of the configuration documents.
//!
//! A snapshot of each document is taken after every successful load or save
//! and serves as the replay base for undo/redo. The currently selected UI
//! language is kept alongside under the `lang` key.

mod storage;

pub use storage::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};

use crate::document::DocumentSet;
use crate::error::{EditorError, Result};
use crate::types::Category;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Key holding the selected language code.
pub const LANGUAGE_KEY: &str = "lang";

/// Typed access to a [`SnapshotStore`].
#[derive(Clone)]
pub struct Snapshots {
    store: Arc<dyn SnapshotStore>,
}

impl Snapshots {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Snapshots held in memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySnapshotStore::new()))
    }

    pub fn write_document(&self, category: Category, doc: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.store.write(category.snapshot_key(), &bytes)
    }

    pub fn read_document(&self, category: Category) -> Result<Option<Value>> {
        match self.store.read(category.snapshot_key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Snapshot every document in `docs`.
    pub fn write_all(&self, docs: &DocumentSet) -> Result<()> {
        for (category, doc) in docs.iter() {
            self.write_document(category, doc)?;
        }
        Ok(())
    }

    /// The replay base.
    ///
    /// The settings snapshot must exist; the others default to empty
    /// mappings when absent.
    pub fn base_documents(&self) -> Result<DocumentSet> {
        let mut docs = DocumentSet::new();
        for category in Category::ALL {
            match self.read_document(category)? {
                Some(doc) => docs.replace(category, doc),
                None if category == Category::Settings => {
                    return Err(EditorError::NoSnapshot(category));
                }
                None => docs.replace(category, Value::Object(Map::new())),
            }
        }
        Ok(docs)
    }

    pub fn clear_documents(&self) -> Result<()> {
        for category in Category::ALL {
            self.store.remove(category.snapshot_key())?;
        }
        Ok(())
    }

    pub fn language(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .read(LANGUAGE_KEY)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub fn set_language(&self, code: &str) -> Result<()> {
        self.store.write(LANGUAGE_KEY, code.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_requires_settings_snapshot() {
        let snapshots = Snapshots::in_memory();
        snapshots.write_document(Category::Worlds, &json!({"worlds": {}})).unwrap();
        assert!(matches!(
            snapshots.base_documents(),
            Err(EditorError::NoSnapshot(Category::Settings))
        ));
    }

    #[test]
    fn test_base_defaults_missing_documents() {
        let snapshots = Snapshots::in_memory();
        snapshots.write_document(Category::Settings, &json!({"events": {}})).unwrap();
        let base = snapshots.base_documents().unwrap();
        assert_eq!(base.get(Category::Settings), &json!({"events": {}}));
        assert_eq!(base.get(Category::Equipment), &json!({}));
    }

    #[test]
    fn test_language_roundtrip() {
        let snapshots = Snapshots::in_memory();
        assert_eq!(snapshots.language().unwrap(), None);
        snapshots.set_language("de").unwrap();
        assert_eq!(snapshots.language().unwrap().as_deref(), Some("de"));
    }
}
