//! Modal editors for events, worlds and equipment sets.
//!
//! Each editor holds a deep copy of one entity while open. Nothing touches
//! the live documents until [`ModalEditor::save`] succeeds; it hands back the
//! change record for the session to apply and log. A failed validation keeps
//! the editor open with its scratch intact.

mod equipment;
mod event;
mod world;

pub use equipment::{EquipmentSchema, EquipmentWorkspace};
pub use event::{EventSchema, EventSpawnType, RewardKind, RewardTier, WinCondition};
pub use world::{WorldSchema, WorldSpawnType};

use crate::document::{delete_value, get_value, get_value_mut, set_value};
use crate::error::{EditorError, Result};
use crate::i18n::Translations;
use crate::types::{ChangeRecord, EntityKind};
use serde_json::{json, Map, Value};
use std::marker::PhantomData;

pub type EventEditor = ModalEditor<EventSchema>;
pub type WorldEditor = ModalEditor<WorldSchema>;
pub type EquipmentEditor = ModalEditor<EquipmentSchema>;

/// Editor-only state derived from the scratch data while a modal is open.
pub trait Workspace: Default {
    fn load(data: &Value) -> Result<Self>;

    /// Fold the workspace back into the scratch data before saving.
    fn store(&self, data: &mut Value);
}

impl Workspace for () {
    fn load(_: &Value) -> Result<Self> {
        Ok(())
    }

    fn store(&self, _: &mut Value) {}
}

/// Per-kind defaults and validation.
pub trait EntitySchema {
    const KIND: EntityKind;

    /// Toast key published after a successful save.
    const SAVED_KEY: &'static str;

    /// Whether the id is kept inside the stored data.
    const KEEPS_ID: bool;

    type Workspace: Workspace;

    /// Id proposed for a new entity.
    fn new_id() -> String {
        String::new()
    }

    /// Complete template for a new entity.
    fn template(tr: &Translations) -> Value;

    /// Keys filled in when opening an existing entity that lacks them.
    fn open_defaults(tr: &Translations) -> Value;

    fn validate(scratch: &Scratch) -> Result<()>;
}

/// Deep copy of the entity being edited.
#[derive(Clone, Debug, PartialEq)]
pub struct Scratch {
    pub id: String,
    pub data: Value,
    pub is_new: bool,
}

/// Insert every key of `defaults` that `target` lacks, recursing into
/// mappings present on both sides. Existing values are never overwritten.
pub(crate) fn fill_missing(target: &mut Value, defaults: &Value) {
    let (Some(target), Some(defaults)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };
    for (key, default) in defaults {
        match target.get_mut(key) {
            None | Some(Value::Null) => {
                target.insert(key.clone(), default.clone());
            }
            Some(existing) => fill_missing(existing, default),
        }
    }
}

/// `{x, y, z, yaw, pitch}` spawn point.
pub(crate) fn spawn_point(x: f64, y: f64, z: f64, yaw: f64, pitch: f64) -> Value {
    json!({"x": x, "y": y, "z": z, "yaw": yaw, "pitch": pitch})
}

/// Closed/Open state machine over one entity kind.
pub struct ModalEditor<S: EntitySchema> {
    scratch: Option<Scratch>,
    workspace: S::Workspace,
    _schema: PhantomData<fn() -> S>,
}

impl<S: EntitySchema> Default for ModalEditor<S> {
    fn default() -> Self {
        Self {
            scratch: None,
            workspace: S::Workspace::default(),
            _schema: PhantomData,
        }
    }
}

impl<S: EntitySchema> ModalEditor<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.scratch.is_some()
    }

    pub fn scratch(&self) -> Option<&Scratch> {
        self.scratch.as_ref()
    }

    fn scratch_mut(&mut self) -> Result<&mut Scratch> {
        self.scratch.as_mut().ok_or(EditorError::EditorClosed)
    }

    pub(crate) fn workspace(&self) -> &S::Workspace {
        &self.workspace
    }

    pub(crate) fn workspace_mut(&mut self) -> Result<&mut S::Workspace> {
        if self.scratch.is_none() {
            return Err(EditorError::EditorClosed);
        }
        Ok(&mut self.workspace)
    }

    /// Open on a fresh template. Replaces any open scratch.
    pub fn open_new(&mut self, tr: &Translations) -> &Scratch {
        let id = S::new_id();
        let mut data = S::template(tr);
        if S::KEEPS_ID {
            if let Value::Object(map) = &mut data {
                map.insert("id".into(), Value::String(id.clone()));
            }
        }
        self.workspace = S::Workspace::load(&data).unwrap_or_default();
        tracing::debug!(kind = %S::KIND, %id, "editor opened on new entity");
        self.scratch.insert(Scratch { id, data, is_new: true })
    }

    /// Open on a deep copy of `<collection>.<id>` in `doc`.
    pub fn open_existing(&mut self, doc: &Value, id: &str, tr: &Translations) -> Result<&Scratch> {
        let mut data = get_value(doc, &S::KIND.entity_path(id))
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(|| EditorError::NotFound(format!("{} {id}", S::KIND)))?;
        fill_missing(&mut data, &S::open_defaults(tr));
        if let Value::Object(map) = &mut data {
            map.insert("id".into(), Value::String(id.to_string()));
        }

        self.workspace = S::Workspace::load(&data)?;
        tracing::debug!(kind = %S::KIND, id, "editor opened");
        Ok(self.scratch.insert(Scratch {
            id: id.to_string(),
            data,
            is_new: false,
        }))
    }

    /// Discard the scratch.
    pub fn cancel(&mut self) {
        self.scratch = None;
        self.workspace = S::Workspace::default();
    }

    pub fn set_id(&mut self, id: &str) -> Result<()> {
        let scratch = self.scratch_mut()?;
        scratch.id = id.trim().to_string();
        if let Value::Object(map) = &mut scratch.data {
            map.insert("id".into(), Value::String(scratch.id.clone()));
        }
        Ok(())
    }

    /// Read a field of the scratch data.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.scratch.as_ref().and_then(|s| get_value(&s.data, path))
    }

    /// Write a field of the scratch data.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let scratch = self.scratch_mut()?;
        set_value(&mut scratch.data, path, value)
    }

    /// Remove a field of the scratch data.
    pub fn remove(&mut self, path: &str) -> Result<Option<Value>> {
        let scratch = self.scratch_mut()?;
        delete_value(&mut scratch.data, path)
    }

    /// Run `f` on the mapping at `path`, creating it if needed.
    pub(crate) fn with_object<T>(
        &mut self,
        path: &str,
        f: impl FnOnce(&mut Map<String, Value>) -> T,
    ) -> Result<T> {
        let scratch = self.scratch_mut()?;
        if !get_value(&scratch.data, path).is_some_and(Value::is_object) {
            set_value(&mut scratch.data, path, Value::Object(Map::new()))?;
        }
        match get_value_mut(&mut scratch.data, path) {
            Some(Value::Object(map)) => Ok(f(map)),
            _ => Err(EditorError::InvalidPath(path.to_string())),
        }
    }

    /// Run `f` on the list at `path`, creating it if needed.
    pub(crate) fn with_list<T>(
        &mut self,
        path: &str,
        f: impl FnOnce(&mut Vec<Value>) -> T,
    ) -> Result<T> {
        let scratch = self.scratch_mut()?;
        if !get_value(&scratch.data, path).is_some_and(Value::is_array) {
            set_value(&mut scratch.data, path, Value::Array(Vec::new()))?;
        }
        match get_value_mut(&mut scratch.data, path) {
            Some(Value::Array(list)) => Ok(f(list)),
            _ => Err(EditorError::InvalidPath(path.to_string())),
        }
    }

    /// Validate and close. On success returns the change record that
    /// commits the entity; on failure the editor stays open.
    pub fn save(&mut self) -> Result<ChangeRecord> {
        let scratch = self.scratch.as_mut().ok_or(EditorError::EditorClosed)?;
        self.workspace.store(&mut scratch.data);
        S::validate(scratch)?;

        let mut data = scratch.data.clone();
        if let Value::Object(map) = &mut data {
            if S::KEEPS_ID {
                map.insert("id".into(), Value::String(scratch.id.clone()));
            } else {
                map.shift_remove("id");
            }
        }
        let record = ChangeRecord::set(S::KIND.category(), S::KIND.entity_path(&scratch.id), data);
        tracing::info!(kind = %S::KIND, id = %scratch.id, "entity saved");
        self.cancel();
        Ok(record)
    }
}
