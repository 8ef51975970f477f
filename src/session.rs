//! The editor session.
//!
//! [`EditorSession`] owns the live documents, the change log, the three
//! modal editors and the translation table. Every user-facing operation goes
//! through it; failures are turned into toasts on the [`Notifier`] and also
//! returned to the caller. Nothing here is fatal to the session.

use crate::config::EditorConfig;
use crate::document::{get_value, set_value, DocumentSet};
use crate::editors::{EntitySchema, EquipmentEditor, EventEditor, ModalEditor, WorldEditor};
use crate::error::{EditorError, Result};
use crate::history::{self, ChangeLog};
use crate::i18n::{LanguageList, Translations};
use crate::lists::{self, EquipmentCard, EventCard, ListView, NavCounts, ViewAction, WorldCard};
use crate::notify::{
    ConnectionState, Notifier, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    ToastLevel,
};
use crate::snapshots::Snapshots;
use crate::status::{self, StatusPoller};
use crate::sync::{Backend, LoadBatch, SyncLayer};
use crate::types::{AuthStatus, Category, ChangeRecord, EntityKind, ExportEnvelope, ServerStatus};
use crate::yaml;
use crossbeam_channel::{bounded, RecvTimeoutError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

const AUTO_EVENTS_PATH: &str = "settings.auto-events.selected-events";
const LANGUAGE_PATH: &str = "settings.language";
const THEME_PATH: &str = "web.theme";

/// Palette written by [`EditorSession::reset_theme`].
pub const DEFAULT_THEME: &[(&str, &str)] = &[
    ("primary-color", "#4caf50"),
    ("secondary-color", "#66bb6a"),
    ("background-color", "#1a1a1a"),
    ("surface-color", "#2d2d2d"),
    ("card-color", "#3a3a3a"),
    ("text-color", "#e0e0e0"),
    ("text-secondary", "#b0b0b0"),
    ("error-color", "#f44336"),
    ("warning-color", "#ff9800"),
    ("success-color", "#4caf50"),
    ("info-color", "#2196f3"),
];

fn default_theme() -> Value {
    Value::Object(
        DEFAULT_THEME
            .iter()
            .map(|(key, color)| (key.to_string(), Value::String(color.to_string())))
            .collect(),
    )
}

/// Key of a theme color inside `web.theme`.
fn theme_key(kind: &str) -> String {
    if kind.ends_with("-color") || kind == "text-secondary" {
        kind.to_string()
    } else {
        format!("{kind}-color")
    }
}

/// Result of applying a load batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        loaded: Vec<Category>,
        failed: Vec<Category>,
    },
    /// A newer load started before this one finished; nothing was applied.
    Stale,
}

/// Result of [`EditorSession::save_all`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to save; no request was made.
    NoChanges,
    Saved {
        categories: Vec<Category>,
    },
    /// Some saves failed. The change log is kept.
    Partial {
        saved: Vec<Category>,
        failed: Vec<Category>,
    },
}

pub struct EditorSession {
    config: EditorConfig,
    sync: SyncLayer,
    backend: Arc<dyn Backend>,
    snapshots: Snapshots,
    notifier: Arc<Notifier>,
    translations: Arc<RwLock<Translations>>,
    languages: LanguageList,
    docs: DocumentSet,
    log: ChangeLog,
    event_editor: EventEditor,
    world_editor: WorldEditor,
    equipment_editor: EquipmentEditor,
    poller: Option<StatusPoller>,
    auth: AuthStatus,
}

impl EditorSession {
    pub fn new(config: EditorConfig, backend: Arc<dyn Backend>, snapshots: Snapshots) -> Self {
        let translations = Translations::new(config.default_language.clone(), Default::default());
        Self {
            config,
            sync: SyncLayer::new(backend.clone()),
            backend,
            snapshots,
            notifier: Arc::new(Notifier::new()),
            translations: Arc::new(RwLock::new(translations)),
            languages: LanguageList::fallback(),
            docs: DocumentSet::new(),
            log: ChangeLog::new(),
            event_editor: EventEditor::new(),
            world_editor: WorldEditor::new(),
            equipment_editor: EquipmentEditor::new(),
            poller: None,
            auth: AuthStatus::default(),
        }
    }

    /// Load translations, check the session and, when allowed, load all
    /// documents. Returns whether the session is authenticated.
    pub fn init(&mut self) -> bool {
        let language = self.initial_language();
        self.languages = LanguageList::load(self.backend.as_ref());
        *self.translations.write() =
            Translations::load(self.backend.as_ref(), &language, &self.config.default_language);
        self.notifier.language_changed(&self.language());

        if self.authenticate() {
            self.load_all();
            true
        } else {
            false
        }
    }

    /// Server setting, then the stored choice, then the configured default.
    fn initial_language(&self) -> String {
        match self.backend.fetch_language() {
            Ok(Some(code)) => return code,
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "server language unavailable"),
        }
        match self.snapshots.language() {
            Ok(Some(code)) if !code.is_empty() => code,
            Ok(_) => self.config.default_language.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored language");
                self.config.default_language.clone()
            }
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn docs(&self) -> &DocumentSet {
        &self.docs
    }

    pub fn document(&self, category: Category) -> &Value {
        self.docs.get(category)
    }

    pub fn log(&self) -> &ChangeLog {
        &self.log
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn snapshots(&self) -> &Snapshots {
        &self.snapshots
    }

    pub fn languages(&self) -> &LanguageList {
        &self.languages
    }

    pub fn language(&self) -> String {
        self.translations.read().code().to_string()
    }

    pub fn auth(&self) -> &AuthStatus {
        &self.auth
    }

    /// Translate `key` in the current language.
    pub fn t(&self, key: &str) -> String {
        self.translations.read().t(key)
    }

    pub fn translations(&self) -> Translations {
        self.translations.read().clone()
    }

    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        self.notifier.subscribe(SubscriptionConfig {
            buffer_size: self.config.event_buffer,
            filter,
        })
    }

    pub fn event_editor(&self) -> &EventEditor {
        &self.event_editor
    }

    pub fn event_editor_mut(&mut self) -> &mut EventEditor {
        &mut self.event_editor
    }

    pub fn world_editor(&self) -> &WorldEditor {
        &self.world_editor
    }

    pub fn world_editor_mut(&mut self) -> &mut WorldEditor {
        &mut self.world_editor
    }

    pub fn equipment_editor(&self) -> &EquipmentEditor {
        &self.equipment_editor
    }

    pub fn equipment_editor_mut(&mut self) -> &mut EquipmentEditor {
        &mut self.equipment_editor
    }

    fn toast(&self, level: ToastLevel, key: &str) {
        let message = self.t(key);
        self.notifier.toast(level, key, message);
    }

    fn toast_with(&self, level: ToastLevel, key: &str, replacements: &[(&str, &str)]) {
        let message = self.translations.read().t_with(key, replacements);
        self.notifier.toast(level, key, message);
    }

    fn notify_history(&self) {
        self.notifier.history_changed(
            self.log.can_undo(),
            self.log.can_redo(),
            self.has_unsaved_changes(),
        );
    }

    // --- Authentication ---

    /// Ask the backend whether this session may edit.
    pub fn authenticate(&mut self) -> bool {
        match self.backend.validate_session() {
            Ok(status) => {
                let allowed = status.authenticated || !status.auth_required;
                tracing::info!(allowed, auth_required = status.auth_required, "session validated");
                self.auth = status;
                allowed
            }
            Err(e) => {
                tracing::warn!(error = %e, "session validation failed");
                self.auth = AuthStatus::default();
                false
            }
        }
    }

    pub fn login(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            self.toast(ToastLevel::Error, "auth.tokenRequired");
            return Err(EditorError::validation("auth.tokenRequired"));
        }

        let reply = match self.backend.login(token) {
            Ok(reply) if reply.success => reply,
            Ok(reply) => {
                let message = reply.error.unwrap_or_else(|| self.t("auth.invalidToken"));
                self.notifier.toast(ToastLevel::Error, "auth.invalidToken", message.clone());
                return Err(EditorError::AuthFailed(message));
            }
            Err(e @ EditorError::AuthFailed(_)) => {
                self.toast(ToastLevel::Error, "auth.invalidToken");
                return Err(e);
            }
            Err(e) => {
                self.toast(ToastLevel::Error, "auth.connectionError");
                return Err(e);
            }
        };

        let player = reply.player_name.unwrap_or_else(|| "Admin".to_string());
        self.auth = AuthStatus {
            authenticated: true,
            auth_required: true,
            player_name: Some(player.clone()),
        };
        tracing::info!(player = %player, "logged in");
        self.toast_with(ToastLevel::Success, "auth.welcome", &[("player", &player)]);
        self.load_all();
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.stop_status_polling();
        if let Err(e) = self.backend.logout() {
            tracing::warn!(error = %e, "logout request failed");
        }
        self.auth = AuthStatus {
            authenticated: false,
            ..self.auth.clone()
        };
        self.toast(ToastLevel::Info, "auth.loggedOut");
        Ok(())
    }

    // --- Loading ---

    /// Start a load and return its batch without applying it.
    pub fn fetch_batch(&self) -> LoadBatch {
        self.sync.fetch_all()
    }

    /// Fetch all four documents and apply them. Publishes a slow-load
    /// warning if the fetch outlasts the configured timeout.
    pub fn load_all(&mut self) -> LoadOutcome {
        self.notifier.loading(true);
        self.notifier
            .connection(ConnectionState::Connecting, self.t("status.connecting"));

        let timeout = self.config.load_timeout();
        let batch = std::thread::scope(|scope| {
            let (tx, rx) = bounded(1);
            let sync = &self.sync;
            scope.spawn(move || {
                let _ = tx.send(sync.fetch_all());
            });

            match rx.recv_timeout(timeout) {
                Ok(batch) => Some(batch),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(?timeout, "document load is slow");
                    self.toast(ToastLevel::Warning, "warning.loadSlow");
                    rx.recv().ok()
                }
                Err(RecvTimeoutError::Disconnected) => None,
            }
        });

        let outcome = match batch {
            Some(batch) => self.apply_load(batch),
            None => {
                self.notifier
                    .connection(ConnectionState::Disconnected, self.t("status.notConnected"));
                self.toast(ToastLevel::Error, "error.loadFailed");
                LoadOutcome::Applied {
                    loaded: Vec::new(),
                    failed: Category::ALL.to_vec(),
                }
            }
        };
        self.notifier.loading(false);
        outcome
    }

    /// Apply a fetched batch unless a newer load has started since.
    pub fn apply_load(&mut self, batch: LoadBatch) -> LoadOutcome {
        if !self.sync.is_current(batch.generation) {
            tracing::debug!(
                generation = batch.generation,
                current = self.sync.current_generation(),
                "discarding stale load"
            );
            return LoadOutcome::Stale;
        }

        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        let mut fresh = Vec::new();
        for (category, result) in batch.results {
            match result {
                Ok(doc) => {
                    loaded.push(category);
                    fresh.push((category, doc));
                }
                Err(_) => failed.push(category),
            }
        }

        for (category, doc) in &fresh {
            if let Err(e) = self.snapshots.write_document(*category, doc) {
                tracing::warn!(%category, error = %e, "snapshot write failed");
            }
        }

        if failed.is_empty() || self.log.is_empty() {
            if !self.log.is_empty() {
                tracing::info!(records = self.log.len(), "load replaces pending changes");
                self.log.clear();
            }
            for (category, doc) in fresh {
                self.docs.replace(category, doc);
            }
        } else {
            // Failed documents still hold unsaved edits, so the log stays and
            // the fresh documents are rebased under it.
            tracing::warn!(
                records = self.log.len(),
                failed = failed.len(),
                "partial load, pending changes kept"
            );
            match self
                .snapshots
                .base_documents()
                .and_then(|base| history::rebuild(&base, &self.log))
            {
                Ok(docs) => self.docs = docs,
                Err(e) => {
                    tracing::warn!(error = %e, "rebase failed, taking fresh documents as-is");
                    for (category, doc) in fresh {
                        self.docs.replace(category, doc);
                    }
                }
            }
        }

        if loaded.is_empty() {
            self.notifier
                .connection(ConnectionState::Disconnected, self.t("status.notConnected"));
            self.toast(ToastLevel::Error, "error.loadFailed");
        } else {
            self.notifier
                .connection(ConnectionState::Connected, self.t("status.connected"));
            self.toast(ToastLevel::Success, "success.loadedConfigs");
        }
        tracing::info!(loaded = loaded.len(), failed = failed.len(), "documents loaded");

        self.notifier.lists_changed(&[]);
        self.notify_history();
        LoadOutcome::Applied { loaded, failed }
    }

    // --- Saving ---

    /// Save every category with applied changes.
    pub fn save_all(&mut self) -> SaveOutcome {
        let changed: BTreeSet<Category> = self.log.changed_categories();
        if changed.is_empty() {
            self.toast(ToastLevel::Info, "info.noChanges");
            return SaveOutcome::NoChanges;
        }

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        for (category, result) in self.sync.save_changed(&self.docs, &changed) {
            match result {
                Ok(()) => saved.push(category),
                Err(_) => failed.push(category),
            }
        }

        if !failed.is_empty() {
            let key = if saved.is_empty() {
                "error.saveFailed"
            } else {
                "error.savePartial"
            };
            self.toast(ToastLevel::Error, key);
            return SaveOutcome::Partial { saved, failed };
        }

        if let Err(e) = self.snapshots.write_all(&self.docs) {
            tracing::warn!(error = %e, "snapshot refresh failed");
        }
        self.log.clear();
        self.toast(ToastLevel::Success, "success.savedAll");
        self.notify_history();
        SaveOutcome::Saved { categories: saved }
    }

    // --- History ---

    pub fn has_unsaved_changes(&self) -> bool {
        !self.log.applied_records().is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Apply `record` to the live documents and append it to the log.
    pub fn record(&mut self, record: ChangeRecord) -> Result<()> {
        self.docs.apply(&record)?;
        tracing::debug!(category = %record.category, path = %record.path, "change recorded");
        let kind = entity_kind_of(&record);
        self.log.record(record);
        self.notify_history();
        match kind {
            Some(kind) => self.notifier.lists_changed(&[kind]),
            None => self.notifier.lists_changed(&[]),
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        if !self.log.can_undo() {
            return Err(EditorError::NothingToUndo);
        }
        let base = self.base_for_replay()?;
        self.log.undo()?;
        if let Err(e) = self.replay_onto(&base) {
            self.log.redo()?;
            return Err(e);
        }
        self.toast(ToastLevel::Info, "history.undo");
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        if !self.log.can_redo() {
            return Err(EditorError::NothingToRedo);
        }
        let base = self.base_for_replay()?;
        self.log.redo()?;
        if let Err(e) = self.replay_onto(&base) {
            self.log.undo()?;
            return Err(e);
        }
        self.toast(ToastLevel::Info, "history.redo");
        Ok(())
    }

    fn base_for_replay(&self) -> Result<DocumentSet> {
        self.snapshots.base_documents().inspect_err(|e| {
            tracing::error!(error = %e, "no snapshot to replay from");
            self.toast(ToastLevel::Error, "error.noBackup");
        })
    }

    fn replay_onto(&mut self, base: &DocumentSet) -> Result<()> {
        self.docs = history::rebuild(base, &self.log)?;
        tracing::debug!(cursor = ?self.log.cursor(), "documents rebuilt");
        self.notifier.lists_changed(&[]);
        self.notify_history();
        Ok(())
    }

    /// Drop all pending changes and reload from the server. Documents the
    /// server does not return fall back to their snapshots.
    pub fn discard(&mut self) -> LoadOutcome {
        self.log.clear();
        match self.snapshots.base_documents() {
            Ok(base) => self.docs = base,
            Err(e) => tracing::warn!(error = %e, "no snapshot to discard to"),
        }
        self.toast(ToastLevel::Info, "history.discarded");
        self.load_all()
    }

    // --- Direct edits ---

    pub fn update_config(&mut self, path: &str, value: Value) -> Result<()> {
        self.record(ChangeRecord::set(Category::Settings, path, value))
    }

    pub fn update_web_config(&mut self, path: &str, value: Value) -> Result<()> {
        self.record(ChangeRecord::set(Category::Web, path, value))
    }

    pub fn delete_event(&mut self, id: &str) -> Result<()> {
        self.delete_entity(EntityKind::Event, id, "toast.eventDeleted")
    }

    pub fn delete_world(&mut self, id: &str) -> Result<()> {
        self.delete_entity(EntityKind::World, id, "toast.worldDeleted")
    }

    pub fn delete_equipment(&mut self, id: &str) -> Result<()> {
        self.delete_entity(EntityKind::Equipment, id, "toast.equipDeleted")
    }

    fn delete_entity(&mut self, kind: EntityKind, id: &str, toast_key: &str) -> Result<()> {
        let path = kind.entity_path(id);
        if get_value(self.docs.get(kind.category()), &path).is_none() {
            return Err(EditorError::NotFound(format!("{kind} {id}")));
        }
        self.record(ChangeRecord::delete(kind.category(), path))?;
        tracing::info!(%kind, id, "entity deleted");
        self.toast_with(ToastLevel::Success, toast_key, &[("id", id)]);
        Ok(())
    }

    // --- Modal editors ---

    /// Open the event editor; `None` starts a new event.
    pub fn open_event(&mut self, id: Option<&str>) -> Result<()> {
        let tr = self.translations();
        open_editor(&mut self.event_editor, self.docs.get(Category::Settings), id, &tr)
    }

    pub fn open_world(&mut self, id: Option<&str>) -> Result<()> {
        let tr = self.translations();
        open_editor(&mut self.world_editor, self.docs.get(Category::Worlds), id, &tr)
    }

    pub fn open_equipment(&mut self, id: Option<&str>) -> Result<()> {
        let tr = self.translations();
        open_editor(&mut self.equipment_editor, self.docs.get(Category::Equipment), id, &tr)
    }

    /// Validate and commit the open event. On a validation error the
    /// editor stays open and an error toast is published.
    pub fn save_event(&mut self) -> Result<()> {
        let result = self.event_editor.save();
        self.finish_save::<crate::editors::EventSchema>(result)
    }

    pub fn save_world(&mut self) -> Result<()> {
        let result = self.world_editor.save();
        self.finish_save::<crate::editors::WorldSchema>(result)
    }

    pub fn save_equipment(&mut self) -> Result<()> {
        let result = self.equipment_editor.save();
        self.finish_save::<crate::editors::EquipmentSchema>(result)
    }

    pub fn cancel_editors(&mut self) {
        self.event_editor.cancel();
        self.world_editor.cancel();
        self.equipment_editor.cancel();
    }

    fn finish_save<S: EntitySchema>(&mut self, result: Result<ChangeRecord>) -> Result<()> {
        match result {
            Ok(record) => {
                self.record(record)?;
                self.toast(ToastLevel::Success, S::SAVED_KEY);
                Ok(())
            }
            Err(EditorError::Validation { key }) => {
                self.toast(ToastLevel::Error, &key);
                Err(EditorError::Validation { key })
            }
            Err(e) => Err(e),
        }
    }

    /// Run a card action.
    pub fn dispatch(&mut self, action: ViewAction) -> Result<()> {
        match action {
            ViewAction::Create { kind } => self.open_kind(kind, None),
            ViewAction::Edit { kind, id } => self.open_kind(kind, Some(&id)),
            ViewAction::Delete { kind, id } => match kind {
                EntityKind::Event => self.delete_event(&id),
                EntityKind::World => self.delete_world(&id),
                EntityKind::Equipment => self.delete_equipment(&id),
            },
        }
    }

    fn open_kind(&mut self, kind: EntityKind, id: Option<&str>) -> Result<()> {
        match kind {
            EntityKind::Event => self.open_event(id),
            EntityKind::World => self.open_world(id),
            EntityKind::Equipment => self.open_equipment(id),
        }
    }

    // --- Language ---

    /// Switch the UI language. If the locale can't be loaded nothing changes.
    pub fn change_language(&mut self, code: &str) -> Result<()> {
        let strings = match self.backend.fetch_locale(code) {
            Ok(strings) => strings,
            Err(e) => {
                tracing::warn!(language = code, error = %e, "language change failed");
                self.toast(ToastLevel::Error, "language.error");
                return Err(e);
            }
        };

        *self.translations.write() = Translations::new(code, strings);
        if let Err(e) = self.snapshots.set_language(code) {
            tracing::warn!(error = %e, "could not store language");
        }
        if let Err(e) = self.backend.save_language(code) {
            tracing::warn!(error = %e, "could not save language on the server");
        }

        // Folded into the live document and its snapshot without a record.
        let value = Value::String(code.to_string());
        set_value(self.docs.get_mut(Category::Settings), LANGUAGE_PATH, value.clone())?;
        match self.snapshots.read_document(Category::Settings) {
            Ok(Some(mut base)) => {
                set_value(&mut base, LANGUAGE_PATH, value)?;
                if let Err(e) = self.snapshots.write_document(Category::Settings, &base) {
                    tracing::warn!(error = %e, "settings snapshot update failed");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "settings snapshot unreadable"),
        }

        tracing::info!(language = code, "language changed");
        self.notifier.language_changed(code);
        self.notifier.lists_changed(&[]);
        self.toast(ToastLevel::Success, "success.saved");
        Ok(())
    }

    // --- Theme ---

    pub fn update_theme_color(&mut self, kind: &str, hex: &str) -> Result<()> {
        let path = format!("{THEME_PATH}.{}", theme_key(kind));
        self.update_web_config(&path, Value::String(hex.to_string()))
    }

    pub fn reset_theme(&mut self) -> Result<()> {
        self.update_web_config(THEME_PATH, default_theme())?;
        self.toast(ToastLevel::Success, "theme.reset");
        Ok(())
    }

    // --- Auto-events ---

    pub fn selected_auto_events(&self) -> Vec<String> {
        get_value(self.docs.get(Category::Settings), AUTO_EVENTS_PATH)
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns false if the event was already selected.
    pub fn add_auto_event(&mut self, id: &str) -> Result<bool> {
        let mut selected = self.selected_auto_events();
        if id.is_empty() || selected.iter().any(|s| s == id) {
            return Ok(false);
        }
        selected.push(id.to_string());
        self.record_auto_events(selected)?;
        Ok(true)
    }

    pub fn remove_auto_event(&mut self, id: &str) -> Result<bool> {
        let mut selected = self.selected_auto_events();
        let Some(index) = selected.iter().position(|s| s == id) else {
            return Ok(false);
        };
        selected.remove(index);
        self.record_auto_events(selected)?;
        Ok(true)
    }

    pub fn move_auto_event_up(&mut self, id: &str) -> Result<bool> {
        let mut selected = self.selected_auto_events();
        match selected.iter().position(|s| s == id) {
            Some(index) if index > 0 => {
                selected.swap(index, index - 1);
                self.record_auto_events(selected)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn move_auto_event_down(&mut self, id: &str) -> Result<bool> {
        let mut selected = self.selected_auto_events();
        match selected.iter().position(|s| s == id) {
            Some(index) if index + 1 < selected.len() => {
                selected.swap(index, index + 1);
                self.record_auto_events(selected)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn record_auto_events(&mut self, selected: Vec<String>) -> Result<()> {
        let list = selected.into_iter().map(Value::String).collect();
        self.update_config(AUTO_EVENTS_PATH, Value::Array(list))
    }

    // --- Export / import ---

    pub fn export(&self) -> ExportEnvelope {
        ExportEnvelope {
            config: Some(self.docs.get(Category::Settings).clone()),
            worlds: Some(self.docs.get(Category::Worlds).clone()),
            equipment: Some(self.docs.get(Category::Equipment).clone()),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn export_json(&self) -> Result<String> {
        let text = serde_json::to_string_pretty(&self.export())?;
        self.toast(ToastLevel::Success, "export.success");
        Ok(text)
    }

    /// Replace the documents present in an export envelope. Each replaced
    /// document becomes one undoable record.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let envelope: ExportEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                let message = e.to_string();
                self.toast_with(ToastLevel::Error, "import.error", &[("message", &message)]);
                return Err(e.into());
            }
        };

        let parts = [
            (Category::Settings, envelope.config),
            (Category::Worlds, envelope.worlds),
            (Category::Equipment, envelope.equipment),
        ];
        for (category, doc) in parts {
            if let Some(doc) = doc.filter(|d| !d.is_null()) {
                self.record(ChangeRecord::set(category, "", doc))?;
            }
        }
        tracing::info!("configuration imported");
        self.toast(ToastLevel::Success, "import.success");
        Ok(())
    }

    // --- Server ---

    pub fn reload_server(&mut self) -> Result<()> {
        match self.backend.reload() {
            Ok(ack) => {
                let message = ack.message.unwrap_or_else(|| "OK".to_string());
                self.toast_with(ToastLevel::Success, "server.reloadSuccess", &[("message", &message)]);
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    EditorError::Rejected(m) | EditorError::Status { message: m, .. } => m.clone(),
                    other => other.to_string(),
                };
                self.toast_with(ToastLevel::Error, "server.reloadError", &[("message", &message)]);
                Err(e)
            }
        }
    }

    pub fn check_status(&self) -> Option<ServerStatus> {
        status::poll_once(self.backend.as_ref(), &self.notifier, &self.translations)
    }

    /// Start the background poller at the configured interval. A running
    /// poller is replaced.
    pub fn start_status_polling(&mut self) {
        self.stop_status_polling();
        self.poller = Some(StatusPoller::start(
            self.backend.clone(),
            self.notifier.clone(),
            self.translations.clone(),
            self.config.status_interval(),
        ));
    }

    pub fn stop_status_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(StatusPoller::is_running)
    }

    // --- Views ---

    pub fn yaml_preview(&self, category: Category) -> Result<String> {
        yaml::to_yaml(self.docs.get(category))
    }

    pub fn events_view(&self) -> ListView<EventCard> {
        lists::events_view(self.docs.get(Category::Settings))
    }

    pub fn worlds_view(&self) -> ListView<WorldCard> {
        lists::worlds_view(self.docs.get(Category::Worlds))
    }

    pub fn equipment_view(&self) -> ListView<EquipmentCard> {
        lists::equipment_view(self.docs.get(Category::Equipment))
    }

    pub fn nav_counts(&self) -> NavCounts {
        lists::nav_counts(
            self.docs.get(Category::Settings),
            self.docs.get(Category::Worlds),
            self.docs.get(Category::Equipment),
        )
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.stop_status_polling();
    }
}

fn open_editor<S: EntitySchema>(
    editor: &mut ModalEditor<S>,
    doc: &Value,
    id: Option<&str>,
    tr: &Translations,
) -> Result<()> {
    match id {
        Some(id) => editor.open_existing(doc, id, tr).map(|_| ()),
        None => {
            editor.open_new(tr);
            Ok(())
        }
    }
}

/// Entity kind a record touches, if it addresses one entity collection.
fn entity_kind_of(record: &ChangeRecord) -> Option<EntityKind> {
    let head = record.path.split('.').next().unwrap_or_default();
    [EntityKind::Event, EntityKind::World, EntityKind::Equipment]
        .into_iter()
        .find(|kind| kind.category() == record.category && kind.collection() == head)
}
