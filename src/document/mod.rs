//! The four live configuration documents and change application.

mod path;

pub use path::{delete_value, get_bool, get_i64, get_str, get_value, get_value_mut, set_value};

use crate::error::Result;
use crate::types::{Category, ChangeOp, ChangeRecord};
use serde_json::{Map, Value};

/// Live in-memory documents, one per category.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSet {
    docs: [Value; 4],
}

impl Default for DocumentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSet {
    /// Four empty mappings.
    pub fn new() -> Self {
        Self {
            docs: std::array::from_fn(|_| Value::Object(Map::new())),
        }
    }

    pub fn get(&self, category: Category) -> &Value {
        &self.docs[category.index()]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Value {
        &mut self.docs[category.index()]
    }

    /// Replace a whole document.
    pub fn replace(&mut self, category: Category, doc: Value) {
        self.docs[category.index()] = doc;
    }

    /// Apply one change record.
    pub fn apply(&mut self, record: &ChangeRecord) -> Result<()> {
        let doc = self.get_mut(record.category);
        match &record.op {
            ChangeOp::Set { value } => set_value(doc, &record.path, value.clone()),
            ChangeOp::Delete => delete_value(doc, &record.path).map(|_| ()),
        }
    }

    /// Rebuild state from a base set by applying `records` in order.
    pub fn replay<'a>(
        base: &DocumentSet,
        records: impl IntoIterator<Item = &'a ChangeRecord>,
    ) -> Result<DocumentSet> {
        let mut docs = base.clone();
        for record in records {
            docs.apply(record)?;
        }
        Ok(docs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &Value)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
