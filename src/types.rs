//! Core types shared across the editor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the four independently-keyed configuration documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Settings,
    Worlds,
    Equipment,
    Web,
}

impl Category {
    /// All categories, in load order.
    pub const ALL: [Category; 4] = [
        Category::Settings,
        Category::Worlds,
        Category::Equipment,
        Category::Web,
    ];

    /// Key under which the document's snapshot is persisted.
    pub fn snapshot_key(self) -> &'static str {
        match self {
            Category::Settings => "config_backup",
            Category::Worlds => "worlds_backup",
            Category::Equipment => "equipment_backup",
            Category::Web => "webconfig_backup",
        }
    }

    /// Path segment of the backend endpoints (`/api/<segment>/get`).
    pub fn api_segment(self) -> &'static str {
        match self {
            Category::Settings => "config",
            Category::Worlds => "worlds",
            Category::Equipment => "equipment",
            Category::Web => "webconfig",
        }
    }

    /// Index into fixed-size per-category arrays.
    pub fn index(self) -> usize {
        match self {
            Category::Settings => 0,
            Category::Worlds => 1,
            Category::Equipment => 2,
            Category::Web => 3,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "settings" | "config" => Some(Category::Settings),
            "worlds" => Some(Category::Worlds),
            "equipment" => Some(Category::Equipment),
            "web" | "webconfig" => Some(Category::Web),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Settings => "settings",
            Category::Worlds => "worlds",
            Category::Equipment => "equipment",
            Category::Web => "web",
        };
        write!(f, "{}", name)
    }
}

/// Kind of entity with a list view and a modal editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Event,
    World,
    Equipment,
}

impl EntityKind {
    /// Document the entity collection lives in.
    pub fn category(self) -> Category {
        match self {
            EntityKind::Event => Category::Settings,
            EntityKind::World => Category::Worlds,
            EntityKind::Equipment => Category::Equipment,
        }
    }

    /// Mapping that holds the entities, keyed by id.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Event => "events",
            EntityKind::World => "worlds",
            EntityKind::Equipment => "equipment-sets",
        }
    }

    /// Path of one entity inside its document.
    pub fn entity_path(self, id: &str) -> String {
        format!("{}.{}", self.collection(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Event => "event",
            EntityKind::World => "world",
            EntityKind::Equipment => "equipment",
        };
        write!(f, "{}", name)
    }
}

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp_micros())
    }

    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// What a change record does at its path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ChangeOp {
    /// Assign the value (null included) at the path.
    Set { value: Value },
    /// Remove the key at the path.
    Delete,
}

/// A single recorded mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub category: Category,

    /// Dot-separated path inside the category's document.
    pub path: String,

    #[serde(flatten)]
    pub op: ChangeOp,

    pub timestamp: Timestamp,
}

impl ChangeRecord {
    pub fn set(category: Category, path: impl Into<String>, value: Value) -> Self {
        Self {
            category,
            path: path.into(),
            op: ChangeOp::Set { value },
            timestamp: Timestamp::now(),
        }
    }

    pub fn delete(category: Category, path: impl Into<String>) -> Self {
        Self {
            category,
            path: path.into(),
            op: ChangeOp::Delete,
            timestamp: Timestamp::now(),
        }
    }
}

/// Server status as reported by `/api/status`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerStatus {
    pub plugin_name: String,
    pub plugin_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    pub online_players: u32,
    pub max_players: u32,
    pub tps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Session state as reported by `/api/auth/validate`.
///
/// A reply without `authRequired` counts as requiring auth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub auth_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self {
            authenticated: false,
            auth_required: true,
            player_name: None,
        }
    }
}

/// Reply to `/api/auth/login`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// File-based import/export envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub worlds: Option<Value>,
    #[serde(default)]
    pub equipment: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
