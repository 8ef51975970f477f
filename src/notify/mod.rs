//! In-process notifications from the editor session.
//!
//! The session publishes toasts, the connection indicator, loading state,
//! history state and "lists changed" hints. Frontends subscribe and redraw.
//!
//! # Example
//!
//! ```ignore
//! let handle = session.notifier().subscribe(SubscriptionConfig::default());
//! while let Ok(event) = handle.recv() {
//!     match event {
//!         EditorEvent::Toast { message, .. } => println!("{message}"),
//!         EditorEvent::Dropped { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::Notifier;
pub use types::{
    ConnectionState, DropReason, EditorEvent, SubscriptionConfig, SubscriptionFilter,
    SubscriptionHandle, SubscriptionId, ToastLevel,
};
