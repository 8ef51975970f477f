//! Change tracking and undo/redo.
//!
//! Every committed edit is appended to a [`ChangeLog`]. Undo and redo only
//! move the cursor; the live documents are then rebuilt by replaying the
//! applied prefix of the log against the last snapshot (see [`rebuild`]).

mod log;

pub use log::ChangeLog;

use crate::document::DocumentSet;
use crate::error::Result;

/// Reconstruct live state at the log's cursor from `base`.
pub fn rebuild(base: &DocumentSet, log: &ChangeLog) -> Result<DocumentSet> {
    DocumentSet::replay(base, log.applied_records())
}
