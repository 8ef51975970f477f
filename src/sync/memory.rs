//! In-process backend with demo data, failure injection and request counters.

use super::Backend;
use crate::error::{EditorError, Result};
use crate::i18n::{LanguageInfo, LanguageList, LocaleSource};
use crate::types::{Ack, AuthStatus, Category, LoginReply, ServerStatus};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

const EN: &[(&str, &str)] = &[
    ("app.title", "Event-PVP Config"),
    ("success.loadedConfigs", "Configuration loaded"),
    ("error.loadFailed", "Could not load configuration"),
    ("warning.loadSlow", "Loading takes longer than expected"),
    ("info.noChanges", "No changes to save"),
    ("success.savedAll", "All changes saved"),
    ("error.saveFailed", "Saving failed"),
    ("error.savePartial", "Some changes could not be saved"),
    ("error.noBackup", "No backup available"),
    ("error.fieldRequired", "Please fill in all required fields"),
    ("error.invalidId", "Ids must not contain dots"),
    ("label.worldIdEmpty", "World id must not be empty"),
    ("label.itemAdded", "{item} added"),
    ("label.emptyInventory", "Inventory is full"),
    ("events.saved", "Event saved"),
    ("worlds.saved", "World saved"),
    ("equipment.saved", "Equipment set saved"),
    ("toast.eventDeleted", "Event {id} deleted"),
    ("toast.worldDeleted", "World {id} deleted"),
    ("toast.equipDeleted", "Equipment set {id} deleted"),
    ("theme.reset", "Theme reset"),
    ("export.success", "Configuration exported"),
    ("import.success", "Configuration imported"),
    ("import.error", "Import failed: {message}"),
    ("auth.tokenRequired", "Please enter a token"),
    ("auth.welcome", "Welcome, {player}"),
    ("auth.invalidToken", "Invalid token"),
    ("auth.connectionError", "Connection error"),
    ("auth.loggedOut", "Logged out"),
    ("auth.required", "Login required, pass --token"),
    ("history.unsavedOnExit", "Unsaved changes were discarded"),
    ("server.reloadSuccess", "Reloaded: {message}"),
    ("server.reloadError", "Reload failed: {message}"),
    ("history.undo", "Change undone"),
    ("history.redo", "Change redone"),
    ("history.discarded", "Changes discarded"),
    ("success.saved", "Saved"),
    ("language.error", "Could not load language"),
    ("status.connecting", "Connecting..."),
    ("status.connected", "Connected"),
    ("status.connectedDetail", "{name} v{version}"),
    ("status.notConnected", "Not connected"),
    ("label.noEvents", "No events configured"),
    ("label.noWorlds", "No worlds configured"),
    ("label.noEquipment", "No equipment sets configured"),
    ("button.createEvent", "Create event"),
    ("button.createWorld", "Create world"),
    ("button.createEquipment", "Create equipment set"),
    ("card.active", "Active"),
    ("card.inactive", "Inactive"),
    ("card.more", "+{count} more"),
];

const DE: &[(&str, &str)] = &[
    ("app.title", "Event-PVP Konfiguration"),
    ("success.loadedConfigs", "Konfiguration geladen"),
    ("error.loadFailed", "Konfiguration konnte nicht geladen werden"),
    ("info.noChanges", "Keine Änderungen zum Speichern"),
    ("success.savedAll", "Alle Änderungen gespeichert"),
    ("error.savePartial", "Einige Änderungen konnten nicht gespeichert werden"),
    ("error.noBackup", "Kein Backup vorhanden"),
    ("error.fieldRequired", "Bitte alle Pflichtfelder ausfüllen"),
    ("events.saved", "Event gespeichert"),
    ("toast.worldDeleted", "Welt {id} gelöscht"),
    ("label.noEvents", "Keine Events konfiguriert"),
    ("success.saved", "Gespeichert"),
];

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Backend kept entirely in memory.
///
/// [`MemoryBackend::demo`] serves a small sample configuration and is what
/// the CLI runs against with `--demo`.
pub struct MemoryBackend {
    docs: RwLock<[Value; 4]>,
    fail_fetch: [AtomicBool; 4],
    fail_save: [AtomicBool; 4],
    fetch_delay: RwLock<Duration>,
    offline: AtomicBool,
    token: RwLock<Option<String>>,
    logged_in: AtomicBool,
    language: RwLock<Option<String>>,
    locales: RwLock<HashMap<String, HashMap<String, String>>>,
    status: RwLock<ServerStatus>,
    fetches: AtomicUsize,
    saves: AtomicUsize,
    reloads: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty documents, no auth, English and German locales.
    pub fn new() -> Self {
        let mut locales = HashMap::new();
        locales.insert("en".to_string(), table(EN));
        locales.insert("de".to_string(), table(DE));

        Self {
            docs: RwLock::new(std::array::from_fn(|_| Value::Object(Map::new()))),
            fail_fetch: Default::default(),
            fail_save: Default::default(),
            fetch_delay: RwLock::new(Duration::ZERO),
            offline: AtomicBool::new(false),
            token: RwLock::new(None),
            logged_in: AtomicBool::new(false),
            language: RwLock::new(None),
            locales: RwLock::new(locales),
            status: RwLock::new(ServerStatus {
                plugin_name: "EventPVP".into(),
                plugin_version: "1.0.0".into(),
                server_version: Some("Paper 1.21".into()),
                online_players: 3,
                max_players: 20,
                tps: 19.9,
                uptime: Some("2h 14m".into()),
                language: None,
            }),
            fetches: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            reloads: AtomicUsize::new(0),
        }
    }

    /// Sample event, world and equipment set.
    pub fn demo() -> Self {
        let backend = Self::new();
        backend.set_document(
            Category::Settings,
            json!({
                "settings": {
                    "language": "en",
                    "auto-events": {
                        "enabled": false,
                        "interval-min": 1800,
                        "interval-max": 3600,
                        "selected-events": ["pvparena"]
                    }
                },
                "events": {
                    "pvparena": {
                        "enabled": true,
                        "command": "pvparena",
                        "display-name": "PvP Arena",
                        "description": "Last player standing wins",
                        "min-players": 2,
                        "max-players": 16,
                        "countdown-time": 30,
                        "worlds": {"lobby-world": "EventLobby", "event-world": "arena_world"},
                        "spawn-settings": {"spawn-type": "RANDOM_RADIUS", "center": {"x": 0, "y": 64, "z": 0}, "radius": 30},
                        "equipment-group": "pvp_starter",
                        "mechanics": {"game-mode": "SOLO", "pvp-enabled": true, "hunger-enabled": false},
                        "win-condition": {"type": "LAST_STANDING"}
                    }
                }
            }),
        );
        backend.set_document(
            Category::Worlds,
            json!({"worlds": {
                "arena_world": {
                    "display-name": "Arena",
                    "pvpwager-world-enable": true,
                    "build-allowed": false,
                    "regenerate-world": true,
                    "clone-source-world": "arena_template",
                    "pvpwager-spawn": {
                        "spawn-type": "FIXED_SPAWNS",
                        "spawns": {
                            "spectator": {"x": 0, "y": 80, "z": 0, "yaw": 0, "pitch": 0},
                            "player1": {"x": 10, "y": 64, "z": 0, "yaw": 90, "pitch": 0},
                            "player2": {"x": -10, "y": 64, "z": 0, "yaw": -90, "pitch": 0}
                        }
                    },
                    "allowed-equipment-groups": ["all"]
                }
            }}),
        );
        backend.set_document(
            Category::Equipment,
            json!({"equipment-sets": {
                "pvp_starter": {
                    "enabled": true,
                    "display-name": "PvP Starter",
                    "allowed-pvpwager-worlds": "all",
                    "armor": {"helmet": "IRON_HELMET", "chestplate": "IRON_CHESTPLATE", "leggings": "IRON_LEGGINGS", "boots": "IRON_BOOTS"},
                    "offhand": "SHIELD",
                    "inventory": [
                        {"slot": 0, "item": "IRON_SWORD", "amount": 1, "enchantments": ["SHARPNESS:1"]},
                        {"slot": 1, "item": "BOW", "amount": 1},
                        {"slot": 2, "item": "ARROW", "amount": 32},
                        {"slot": 3, "item": "GOLDEN_APPLE", "amount": 2},
                        {"slot": 8, "item": "COOKED_BEEF", "amount": 16}
                    ]
                }
            }}),
        );
        backend.set_document(
            Category::Web,
            json!({"web": {"port": 8080, "theme": {"primary-color": "#4caf50"}}}),
        );
        backend
    }

    /// Require `token` for login.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        *self.token.write() = Some(token.into());
        self
    }

    pub fn set_document(&self, category: Category, doc: Value) {
        self.docs.write()[category.index()] = doc;
    }

    pub fn document(&self, category: Category) -> Value {
        self.docs.read()[category.index()].clone()
    }

    pub fn set_locale(&self, code: &str, strings: HashMap<String, String>) {
        self.locales.write().insert(code.to_string(), strings);
    }

    pub fn stored_language(&self) -> Option<String> {
        self.language.read().clone()
    }

    // --- Failure injection ---

    pub fn fail_fetch(&self, category: Category, fail: bool) {
        self.fail_fetch[category.index()].store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, category: Category, fail: bool) {
        self.fail_save[category.index()].store(fail, Ordering::SeqCst);
    }

    /// Every request fails with a network error while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay applied to each document fetch.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.write() = delay;
    }

    // --- Counters ---

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Document fetches plus saves.
    pub fn request_count(&self) -> usize {
        self.fetch_count() + self.save_count()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(EditorError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn authorized(&self) -> bool {
        self.token.read().is_none() || self.logged_in.load(Ordering::SeqCst)
    }

    fn check_auth(&self) -> Result<()> {
        if self.authorized() {
            Ok(())
        } else {
            Err(EditorError::Status {
                code: 401,
                message: "Not authenticated".into(),
            })
        }
    }
}

impl LocaleSource for MemoryBackend {
    fn fetch_locale(&self, code: &str) -> Result<HashMap<String, String>> {
        self.check_online()?;
        self.locales
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| EditorError::Status {
                code: 404,
                message: format!("/lang/{code}.json not found"),
            })
    }

    fn fetch_language_list(&self) -> Result<LanguageList> {
        self.check_online()?;
        let mut available: Vec<LanguageInfo> = self
            .locales
            .read()
            .keys()
            .map(|code| match code.as_str() {
                "en" => LanguageInfo {
                    code: "en".into(),
                    name: "English".into(),
                    native_name: "English".into(),
                },
                "de" => LanguageInfo {
                    code: "de".into(),
                    name: "German".into(),
                    native_name: "Deutsch".into(),
                },
                other => LanguageInfo {
                    code: other.into(),
                    name: other.into(),
                    native_name: other.into(),
                },
            })
            .collect();
        available.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(LanguageList {
            available,
            default: "en".into(),
        })
    }
}

impl Backend for MemoryBackend {
    fn validate_session(&self) -> Result<AuthStatus> {
        self.check_online()?;
        let auth_required = self.token.read().is_some();
        Ok(AuthStatus {
            authenticated: self.authorized(),
            auth_required,
            player_name: self.logged_in.load(Ordering::SeqCst).then(|| "Admin".to_string()),
        })
    }

    fn login(&self, token: &str) -> Result<LoginReply> {
        self.check_online()?;
        let expected = self.token.read().clone();
        match expected {
            Some(expected) if expected != token => Err(EditorError::AuthFailed("Invalid token".into())),
            _ => {
                self.logged_in.store(true, Ordering::SeqCst);
                Ok(LoginReply {
                    success: true,
                    player_name: Some("Admin".into()),
                    error: None,
                })
            }
        }
    }

    fn logout(&self) -> Result<()> {
        self.check_online()?;
        self.logged_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_document(&self, category: Category) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.read();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.check_online()?;
        self.check_auth()?;
        if self.fail_fetch[category.index()].load(Ordering::SeqCst) {
            return Err(EditorError::Status {
                code: 500,
                message: format!("{category} unavailable"),
            });
        }
        Ok(self.document(category))
    }

    fn save_document(&self, category: Category, doc: &Value) -> Result<Ack> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.check_auth()?;
        if self.fail_save[category.index()].load(Ordering::SeqCst) {
            return Ok(Ack {
                success: false,
                message: Some(format!("{category} could not be written")),
            });
        }
        self.set_document(category, doc.clone());
        Ok(Ack {
            success: true,
            message: Some(format!("{category} saved")),
        })
    }

    fn fetch_language(&self) -> Result<Option<String>> {
        self.check_online()?;
        Ok(self.language.read().clone())
    }

    fn save_language(&self, code: &str) -> Result<()> {
        self.check_online()?;
        *self.language.write() = Some(code.to_string());
        Ok(())
    }

    fn fetch_status(&self) -> Result<ServerStatus> {
        self.check_online()?;
        let mut status = self.status.read().clone();
        status.language = self.language.read().clone();
        Ok(status)
    }

    fn reload(&self) -> Result<Ack> {
        self.check_online()?;
        self.check_auth()?;
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(Ack {
            success: true,
            message: Some("Plugin reloaded".into()),
        })
    }
}
