//! Backend access: the [`Backend`] trait, its HTTP and in-memory
//! implementations, and the [`SyncLayer`] that fans loads and saves out
//! across the four documents.

mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::document::DocumentSet;
use crate::error::{EditorError, Result};
use crate::i18n::LocaleSource;
use crate::types::{Ack, AuthStatus, Category, LoginReply, ServerStatus};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// REST surface of the plugin's web server.
pub trait Backend: LocaleSource + Send + Sync {
    fn validate_session(&self) -> Result<AuthStatus>;

    fn login(&self, token: &str) -> Result<LoginReply>;

    fn logout(&self) -> Result<()>;

    fn fetch_document(&self, category: Category) -> Result<Value>;

    fn save_document(&self, category: Category, doc: &Value) -> Result<Ack>;

    /// Language stored in the plugin config, if any.
    fn fetch_language(&self) -> Result<Option<String>>;

    fn save_language(&self, code: &str) -> Result<()>;

    fn fetch_status(&self) -> Result<ServerStatus>;

    fn reload(&self) -> Result<Ack>;
}

/// Per-category outcome of one load fan-out.
#[derive(Debug)]
pub struct LoadBatch {
    pub generation: u64,
    pub results: Vec<(Category, Result<Value>)>,
}

impl LoadBatch {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

/// Parallel load/save over a shared [`Backend`].
///
/// Every load takes a new generation number; a batch whose generation is
/// no longer the latest must not be applied.
pub struct SyncLayer {
    backend: Arc<dyn Backend>,
    generation: AtomicU64,
}

impl SyncLayer {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            generation: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Fetch all four documents concurrently. Failures are per category.
    pub fn fetch_all(&self) -> LoadBatch {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "loading all documents");

        let results = std::thread::scope(|scope| {
            let handles: Vec<_> = Category::ALL
                .into_iter()
                .map(|category| {
                    let backend = &self.backend;
                    (category, scope.spawn(move || backend.fetch_document(category)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(category, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(EditorError::Network(format!("{category} fetch panicked")))
                    });
                    if let Err(e) = &result {
                        tracing::warn!(%category, error = %e, "document load failed");
                    }
                    (category, result)
                })
                .collect()
        });

        LoadBatch { generation, results }
    }

    /// Save the listed categories concurrently.
    pub fn save_changed(
        &self,
        docs: &DocumentSet,
        categories: &BTreeSet<Category>,
    ) -> Vec<(Category, Result<()>)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = categories
                .iter()
                .map(|&category| {
                    let backend = &self.backend;
                    let doc = docs.get(category);
                    (category, scope.spawn(move || save_one(backend.as_ref(), category, doc)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(category, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(EditorError::Network(format!("{category} save panicked")))
                    });
                    match &result {
                        Ok(()) => tracing::info!(%category, "document saved"),
                        Err(e) => tracing::warn!(%category, error = %e, "document save failed"),
                    }
                    (category, result)
                })
                .collect()
        })
    }
}

fn save_one(backend: &dyn Backend, category: Category, doc: &Value) -> Result<()> {
    let ack = backend.save_document(category, doc)?;
    if ack.success {
        Ok(())
    } else {
        Err(EditorError::Rejected(
            ack.message.unwrap_or_else(|| format!("{category} not saved")),
        ))
    }
}
