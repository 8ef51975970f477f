//! Error types for the configuration editor.

use crate::types::Category;
use thiserror::Error;

/// Main error type for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    #[error("No snapshot available for {0}")]
    NoSnapshot(Category),

    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    #[error("Validation failed: {key}")]
    Validation { key: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Snapshot directory is locked by another process")]
    Locked,

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Inventory is full")]
    InventoryFull,

    #[error("Invalid inventory slot: {0}")]
    InvalidSlot(usize),

    #[error("No editor is open")]
    EditorClosed,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

impl EditorError {
    /// Validation error carrying a translation key.
    pub fn validation(key: impl Into<String>) -> Self {
        EditorError::Validation { key: key.into() }
    }

    /// True for failures caused by the backend being unreachable or unhappy.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EditorError::Network(_) | EditorError::Status { .. } | EditorError::Rejected(_)
        )
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Json(e.to_string())
    }
}

impl From<serde_yaml::Error> for EditorError {
    fn from(e: serde_yaml::Error) -> Self {
        EditorError::Yaml(e.to_string())
    }
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
