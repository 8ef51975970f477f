//! Notification types published by the editor session.

use crate::types::{EntityKind, ServerStatus};
use serde::{Deserialize, Serialize};

/// Severity of a toast message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Backend connection indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 256
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            filter: SubscriptionFilter::all(),
        }
    }
}

/// Which event groups a subscriber wants.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    pub toasts: bool,
    pub connection: bool,
    pub loading: bool,
    pub lists: bool,
    pub history: bool,
    pub status: bool,
}

impl SubscriptionFilter {
    pub fn all() -> Self {
        Self {
            toasts: true,
            connection: true,
            loading: true,
            lists: true,
            history: true,
            status: true,
        }
    }

    pub fn toasts() -> Self {
        Self {
            toasts: true,
            ..Default::default()
        }
    }

    pub fn status() -> Self {
        Self {
            status: true,
            connection: true,
            ..Default::default()
        }
    }

    pub(crate) fn matches(&self, event: &EditorEvent) -> bool {
        match event {
            EditorEvent::Toast { .. } => self.toasts,
            EditorEvent::Connection { .. } => self.connection,
            EditorEvent::Loading { .. } => self.loading,
            EditorEvent::ListsChanged { .. } | EditorEvent::LanguageChanged { .. } => self.lists,
            EditorEvent::HistoryChanged { .. } => self.history,
            EditorEvent::Status { .. } => self.status,
            EditorEvent::Dropped { .. } => true,
        }
    }
}

/// Events emitted to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A user-facing message.
    Toast {
        level: ToastLevel,
        /// Translation key the message was built from.
        key: String,
        /// Rendered text.
        message: String,
    },

    Connection {
        state: ConnectionState,
        label: String,
    },

    /// Blocking-looking overlay shown while loading.
    Loading {
        active: bool,
    },

    /// Lists must be re-projected. Empty `kinds` means all of them.
    ListsChanged {
        kinds: Vec<EntityKind>,
    },

    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
        dirty: bool,
    },

    Status {
        status: ServerStatus,
    },

    LanguageChanged {
        code: String,
    },

    /// Subscription was dropped.
    Dropped {
        reason: DropReason,
    },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to receive events.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    pub receiver: crossbeam_channel::Receiver<EditorEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<EditorEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<EditorEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<EditorEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently buffered.
    pub fn drain(&self) -> Vec<EditorEvent> {
        self.receiver.try_iter().collect()
    }

    /// Translation keys of buffered toasts, consuming all buffered events.
    pub fn drain_toast_keys(&self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                EditorEvent::Toast { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }
}
