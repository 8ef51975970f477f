//! Linear change log with an undo cursor.

use crate::error::{EditorError, Result};
use crate::types::{Category, ChangeRecord};
use std::collections::BTreeSet;

/// Ordered change records plus the number of records currently applied.
///
/// `applied == 0` is the pristine state. The cursor (index of the last
/// applied record) is therefore `applied - 1`, or `None` when pristine.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
    applied: usize,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, discarding any undone records after the cursor.
    pub fn record(&mut self, record: ChangeRecord) {
        if self.applied < self.records.len() {
            tracing::debug!(
                discarded = self.records.len() - self.applied,
                "pruning redo branch"
            );
            self.records.truncate(self.applied);
        }
        self.records.push(record);
        self.applied = self.records.len();
    }

    /// Step the cursor back by one.
    pub fn undo(&mut self) -> Result<()> {
        if !self.can_undo() {
            return Err(EditorError::NothingToUndo);
        }
        self.applied -= 1;
        Ok(())
    }

    /// Step the cursor forward by one.
    pub fn redo(&mut self) -> Result<()> {
        if !self.can_redo() {
            return Err(EditorError::NothingToRedo);
        }
        self.applied += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.records.len()
    }

    /// Index of the last applied record; `None` when pristine.
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, including undone ones.
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// Records `0..=cursor`, in order.
    pub fn applied_records(&self) -> &[ChangeRecord] {
        &self.records[..self.applied]
    }

    /// Drop every record and reset the cursor.
    pub fn clear(&mut self) {
        self.records.clear();
        self.applied = 0;
    }

    /// True if any applied record touches `category`.
    pub fn has_category_changed(&self, category: Category) -> bool {
        self.applied_records().iter().any(|r| r.category == category)
    }

    /// Categories with at least one applied record.
    pub fn changed_categories(&self) -> BTreeSet<Category> {
        self.applied_records().iter().map(|r| r.category).collect()
    }
}
