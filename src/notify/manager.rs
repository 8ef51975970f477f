//! Broadcasts editor events to subscribers.

use crate::types::{EntityKind, ServerStatus};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{
    ConnectionState, DropReason, EditorEvent, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId, ToastLevel,
};

struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<EditorEvent>,
}

impl Subscription {
    /// Returns false if the buffer is full or the receiver is gone.
    fn try_send(&self, event: EditorEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Fan-out of [`EditorEvent`]s over bounded channels.
///
/// Subscribers that fall behind are dropped rather than blocking the editor.
pub struct Notifier {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.max(1));
        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });
        SubscriptionHandle { id, receiver }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscriptions.write().remove(&id) {
            let _ = sub.sender.try_send(EditorEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    // --- Publishing ---

    pub fn toast(&self, level: ToastLevel, key: &str, message: impl Into<String>) {
        let message = message.into();
        match level {
            ToastLevel::Error => tracing::warn!(key, %message, "toast"),
            _ => tracing::info!(key, %message, "toast"),
        }
        self.publish(EditorEvent::Toast {
            level,
            key: key.to_string(),
            message,
        });
    }

    pub fn connection(&self, state: ConnectionState, label: impl Into<String>) {
        self.publish(EditorEvent::Connection {
            state,
            label: label.into(),
        });
    }

    pub fn loading(&self, active: bool) {
        self.publish(EditorEvent::Loading { active });
    }

    pub fn lists_changed(&self, kinds: &[EntityKind]) {
        self.publish(EditorEvent::ListsChanged {
            kinds: kinds.to_vec(),
        });
    }

    pub fn history_changed(&self, can_undo: bool, can_redo: bool, dirty: bool) {
        self.publish(EditorEvent::HistoryChanged {
            can_undo,
            can_redo,
            dirty,
        });
    }

    pub fn status(&self, status: ServerStatus) {
        self.publish(EditorEvent::Status { status });
    }

    pub fn language_changed(&self, code: &str) {
        self.publish(EditorEvent::LanguageChanged {
            code: code.to_string(),
        });
    }

    /// Send to every matching subscriber, dropping the ones that can't keep up.
    pub fn publish(&self, event: EditorEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.config.filter.matches(&event) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if subs.remove(&id).is_some() {
                    tracing::debug!(subscription = id.0, "dropped slow subscriber");
                }
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
