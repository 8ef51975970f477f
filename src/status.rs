//! Background server status polling.

use crate::i18n::Translations;
use crate::notify::{ConnectionState, Notifier};
use crate::sync::Backend;
use crate::types::ServerStatus;
use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Fetch the status once and publish it together with the connection state.
pub fn poll_once(
    backend: &dyn Backend,
    notifier: &Notifier,
    tr: &RwLock<Translations>,
) -> Option<ServerStatus> {
    match backend.fetch_status() {
        Ok(status) => {
            let label = tr.read().t_with(
                "status.connectedDetail",
                &[("name", &status.plugin_name), ("version", &status.plugin_version)],
            );
            notifier.connection(ConnectionState::Connected, label);
            notifier.status(status.clone());
            Some(status)
        }
        Err(e) => {
            tracing::warn!(error = %e, "status check failed");
            notifier.connection(ConnectionState::Disconnected, tr.read().t("status.notConnected"));
            None
        }
    }
}

/// Polls `/api/status` on a fixed interval until stopped or dropped.
pub struct StatusPoller {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Start polling. The first poll happens immediately.
    pub fn start(
        backend: Arc<dyn Backend>,
        notifier: Arc<Notifier>,
        tr: Arc<RwLock<Translations>>,
        interval: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let handle = std::thread::Builder::new()
            .name("status-poller".into())
            .spawn(move || {
                tracing::debug!(?interval, "status poller started");
                poll_once(backend.as_ref(), &notifier, &tr);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            poll_once(backend.as_ref(), &notifier, &tr);
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
                tracing::debug!("status poller stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "could not start status poller");
                None
            }
        };

        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop and wait for the polling thread.
    pub fn stop(&mut self) {
        // Dropping the sender also wakes the select.
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
