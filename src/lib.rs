//! # Event-PVP Config
//!
//! Editing core for the Event-PVP plugin's configuration: four JSON
//! documents (settings, worlds, equipment, web) fetched from the plugin's
//! web server, edited locally and saved back.
//!
//! ## Core Concepts
//!
//! - **Documents**: the live configuration, addressed by dot-separated paths
//! - **Change log**: every edit is a record; undo/redo replays the log
//!   against the last snapshot
//! - **Snapshots**: durable copies of the documents as last loaded or saved
//! - **Editors**: modal scratch copies of one event, world or equipment set
//! - **Sync**: parallel load/save against a [`Backend`]
//!
//! ## Example
//!
//! ```ignore
//! use eventpvp_config::{EditorConfig, EditorSession, MemoryBackend, Snapshots};
//!
//! let mut session = EditorSession::new(
//!     EditorConfig::default(),
//!     Arc::new(MemoryBackend::demo()),
//!     Snapshots::in_memory(),
//! );
//! session.init();
//!
//! session.update_config("settings.auto-events.enabled", json!(true))?;
//! session.undo()?;
//! session.save_all();
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod editors;
pub mod error;
pub mod history;
pub mod i18n;
pub mod inventory;
pub mod lists;
pub mod notify;
pub mod session;
pub mod snapshots;
pub mod status;
pub mod sync;
pub mod types;
pub mod yaml;

// Re-exports
pub use config::EditorConfig;
pub use document::DocumentSet;
pub use editors::{EquipmentEditor, EventEditor, ModalEditor, WorldEditor};
pub use error::{EditorError, Result};
pub use history::ChangeLog;
pub use i18n::{LanguageList, LocaleSource, Translations};
pub use inventory::{DropOutcome, InventoryEntry, InventoryGrid};
pub use lists::{ListView, NavCounts, ViewAction};
pub use notify::{
    ConnectionState, DropReason, EditorEvent, Notifier, SubscriptionConfig, SubscriptionFilter,
    SubscriptionHandle, SubscriptionId, ToastLevel,
};
pub use session::{EditorSession, LoadOutcome, SaveOutcome};
pub use snapshots::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, Snapshots};
pub use status::StatusPoller;
pub use sync::{Backend, HttpBackend, LoadBatch, MemoryBackend, SyncLayer};
pub use types::*;
