//! Event editor: defaults, validation and the spawn, win condition and
//! rewards sub-forms.

use super::{spawn_point, EntitySchema, ModalEditor, Scratch};
use crate::document::get_value;
use crate::error::{EditorError, Result};
use crate::i18n::Translations;
use crate::types::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub struct EventSchema;

/// Reject empty ids and ids that would split the document path.
pub(super) fn check_id(id: &str, missing_key: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(EditorError::validation(missing_key));
    }
    if id.contains('.') {
        return Err(EditorError::validation("error.invalidId"));
    }
    Ok(())
}

fn messages() -> Value {
    json!({
        "start": "&e&lEvent started!",
        "winner": "&6&l{player} wins!",
        "eliminated": "&7{player} was eliminated!",
        "objective": "&7Objective: Win the event"
    })
}

fn empty_rewards() -> Value {
    json!({
        "items": {"enabled": false, "items": []},
        "commands": {"enabled": false, "commands": []}
    })
}

impl EntitySchema for EventSchema {
    const KIND: EntityKind = EntityKind::Event;
    const SAVED_KEY: &'static str = "events.saved";
    const KEEPS_ID: bool = true;
    type Workspace = ();

    fn new_id() -> String {
        format!("event_{}", chrono::Utc::now().timestamp_millis())
    }

    fn template(tr: &Translations) -> Value {
        json!({
            "enabled": true,
            "command": "",
            "display-name": tr.t_or("editor.newEvent", "New Event"),
            "description": "",
            "min-players": 2,
            "max-players": 20,
            "countdown-time": 30,
            "worlds": {
                "lobby-world": "EventLobby",
                "event-world": "EventWorld",
                "build-allowed": false,
                "regenerate-event-world": true,
                "clone-source-event-world": ""
            },
            "spawn-settings": {
                "spawn-type": "SINGLE_POINT",
                "single-spawn": spawn_point(0.0, 64.0, 0.0, 0.0, 0.0)
            },
            "equipment-group": "default",
            "give-equipment-in-lobby": false,
            "lobby-team-colored-armor": false,
            "mechanics": {
                "game-mode": "SOLO",
                "pvp-enabled": true,
                "hunger-enabled": true,
                "friendly-fire": false
            },
            "rewards": {
                "winner": empty_rewards(),
                "participation": empty_rewards()
            },
            "messages": messages()
        })
    }

    fn open_defaults(tr: &Translations) -> Value {
        json!({
            "display-name": tr.t_or("editor.newEvent", "New Event"),
            "description": "",
            "command": "",
            "min-players": 2,
            "max-players": 20,
            "enabled": true,
            "worlds": {
                "lobby-world": "EventLobby",
                "event-world": "EventWorld",
                "build-allowed": false,
                "regenerate-event-world": false,
                "clone-source-event-world": ""
            },
            "spawn-settings": {"spawn-type": "SINGLE_POINT"},
            "mechanics": {"game-mode": "SOLO"},
            "messages": messages()
        })
    }

    fn validate(scratch: &Scratch) -> Result<()> {
        let command = get_value(&scratch.data, "command")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if command.trim().is_empty() {
            return Err(EditorError::validation("error.fieldRequired"));
        }
        check_id(&scratch.id, "error.fieldRequired")
    }
}

/// How players are placed when an event starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSpawnType {
    SinglePoint,
    RandomRadius,
    RandomArea,
    RandomCube,
    MultipleSpawns,
    TeamSpawns,
    Command,
}

impl EventSpawnType {
    pub const ALL: [EventSpawnType; 7] = [
        EventSpawnType::SinglePoint,
        EventSpawnType::RandomRadius,
        EventSpawnType::RandomArea,
        EventSpawnType::RandomCube,
        EventSpawnType::MultipleSpawns,
        EventSpawnType::TeamSpawns,
        EventSpawnType::Command,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventSpawnType::SinglePoint => "SINGLE_POINT",
            EventSpawnType::RandomRadius => "RANDOM_RADIUS",
            EventSpawnType::RandomArea => "RANDOM_AREA",
            EventSpawnType::RandomCube => "RANDOM_CUBE",
            EventSpawnType::MultipleSpawns => "MULTIPLE_SPAWNS",
            EventSpawnType::TeamSpawns => "TEAM_SPAWNS",
            EventSpawnType::Command => "COMMAND",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Sub-form keys seeded when switching to this type.
    fn seed(self) -> Vec<(&'static str, Value)> {
        let xyz = |x: f64, y: f64, z: f64| json!({"x": x, "y": y, "z": z});
        match self {
            EventSpawnType::SinglePoint => {
                vec![("single-spawn", spawn_point(0.0, 64.0, 0.0, 0.0, 0.0))]
            }
            EventSpawnType::RandomRadius => {
                vec![("center", xyz(0.0, 64.0, 0.0)), ("radius", json!(30))]
            }
            EventSpawnType::RandomArea => vec![
                ("min", xyz(-50.0, 64.0, -50.0)),
                ("max", xyz(50.0, 64.0, 50.0)),
            ],
            EventSpawnType::RandomCube => vec![
                ("min", xyz(-50.0, 50.0, -50.0)),
                ("max", xyz(50.0, 80.0, 50.0)),
            ],
            EventSpawnType::MultipleSpawns => vec![("spawns", json!([]))],
            EventSpawnType::TeamSpawns => {
                vec![("team-spawns", json!({"team1": [], "team2": []}))]
            }
            EventSpawnType::Command => vec![("command", json!(""))],
        }
    }
}

/// How an event is won, with the options each kind carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinCondition {
    #[default]
    LastStanding,
    PickupItem {
        #[serde(default = "default_pickup_item")]
        item: String,
        #[serde(default = "default_pickup_amount")]
        amount: u32,
    },
    KillCount {
        #[serde(default = "default_kills")]
        kills: u32,
    },
    TimeSurvival {
        /// Seconds.
        #[serde(default = "default_survival_time")]
        time: u32,
    },
}

fn default_pickup_item() -> String {
    "IRON_INGOT".to_string()
}

fn default_pickup_amount() -> u32 {
    1
}

fn default_kills() -> u32 {
    5
}

fn default_survival_time() -> u32 {
    300
}

impl WinCondition {
    /// Condition of kind `kind` with default options.
    pub fn with_defaults(kind: &str) -> Option<Self> {
        Some(match kind {
            "LAST_STANDING" => WinCondition::LastStanding,
            "PICKUP_ITEM" => WinCondition::PickupItem {
                item: default_pickup_item(),
                amount: default_pickup_amount(),
            },
            "KILL_COUNT" => WinCondition::KillCount { kills: default_kills() },
            "TIME_SURVIVAL" => WinCondition::TimeSurvival {
                time: default_survival_time(),
            },
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardTier {
    Winner,
    Participation,
}

impl RewardTier {
    fn key(self) -> &'static str {
        match self {
            RewardTier::Winner => "winner",
            RewardTier::Participation => "participation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    Items,
    Commands,
}

impl RewardKind {
    fn key(self) -> &'static str {
        match self {
            RewardKind::Items => "items",
            RewardKind::Commands => "commands",
        }
    }
}

fn reward_list(tier: RewardTier, kind: RewardKind) -> String {
    format!("rewards.{}.{}.{}", tier.key(), kind.key(), kind.key())
}

fn remove_at(list: &mut Vec<Value>, index: usize) -> Result<Value> {
    if index < list.len() {
        Ok(list.remove(index))
    } else {
        Err(EditorError::NotFound(format!("entry {index}")))
    }
}

impl ModalEditor<EventSchema> {
    // --- Spawns ---

    pub fn spawn_type(&self) -> Option<EventSpawnType> {
        self.get("spawn-settings.spawn-type")
            .and_then(Value::as_str)
            .and_then(EventSpawnType::parse)
    }

    /// Switch the spawn type, seeding sub-form keys that are missing.
    /// Settings of other spawn types are left in place.
    pub fn set_spawn_type(&mut self, spawn_type: EventSpawnType) -> Result<()> {
        self.with_object("spawn-settings", |settings| {
            settings.insert("spawn-type".into(), json!(spawn_type.as_str()));
            for (key, value) in spawn_type.seed() {
                if settings.get(key).map_or(true, Value::is_null) {
                    settings.insert(key.into(), value);
                }
            }
        })
    }

    /// Set one coordinate of a named spawn (`single-spawn`, `center`, `min`, `max`).
    pub fn set_spawn_coord(&mut self, key: &str, coord: &str, value: f64) -> Result<()> {
        self.set(&format!("spawn-settings.{key}.{coord}"), json!(value))
    }

    /// Append a default point to `MULTIPLE_SPAWNS`. Returns its index.
    pub fn add_spawn_point(&mut self) -> Result<usize> {
        self.with_list("spawn-settings.spawns", |spawns| {
            spawns.push(spawn_point(0.0, 64.0, 0.0, 0.0, 0.0));
            spawns.len() - 1
        })
    }

    pub fn remove_spawn_point(&mut self, index: usize) -> Result<()> {
        self.with_list("spawn-settings.spawns", |spawns| remove_at(spawns, index))?
            .map(|_| ())
    }

    pub fn set_spawn_point_coord(&mut self, index: usize, coord: &str, value: f64) -> Result<()> {
        self.with_list("spawn-settings.spawns", |spawns| match spawns.get_mut(index) {
            Some(Value::Object(point)) => {
                point.insert(coord.to_string(), json!(value));
                Ok(())
            }
            _ => Err(EditorError::NotFound(format!("spawn {index}"))),
        })?
    }

    /// Append a default point to `team` under `TEAM_SPAWNS`. Returns its index.
    pub fn add_team_spawn(&mut self, team: &str) -> Result<usize> {
        self.with_list(&format!("spawn-settings.team-spawns.{team}"), |spawns| {
            spawns.push(spawn_point(0.0, 64.0, 0.0, 0.0, 0.0));
            spawns.len() - 1
        })
    }

    pub fn remove_team_spawn(&mut self, team: &str, index: usize) -> Result<()> {
        self.with_list(&format!("spawn-settings.team-spawns.{team}"), |spawns| {
            remove_at(spawns, index)
        })?
        .map(|_| ())
    }

    // --- Win condition ---

    /// Current win condition; `LAST_STANDING` when unset or unreadable.
    pub fn win_condition(&self) -> WinCondition {
        self.get("win-condition")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_win_condition(&mut self, condition: &WinCondition) -> Result<()> {
        self.set("win-condition", serde_json::to_value(condition)?)
    }

    /// Change only the condition kind, seeding its options with defaults.
    pub fn set_win_condition_type(&mut self, kind: &str) -> Result<()> {
        let condition = WinCondition::with_defaults(kind)
            .ok_or_else(|| EditorError::validation("error.invalidWinCondition"))?;
        self.set_win_condition(&condition)
    }

    // --- Rewards ---

    pub fn set_rewards_enabled(&mut self, tier: RewardTier, kind: RewardKind, enabled: bool) -> Result<()> {
        self.set(
            &format!("rewards.{}.{}.enabled", tier.key(), kind.key()),
            json!(enabled),
        )
    }

    /// Append `{item: DIAMOND, amount: 1}`. Returns its index.
    pub fn add_reward_item(&mut self, tier: RewardTier) -> Result<usize> {
        self.with_list(&reward_list(tier, RewardKind::Items), |items| {
            items.push(json!({"item": "DIAMOND", "amount": 1}));
            items.len() - 1
        })
    }

    pub fn update_reward_item(&mut self, tier: RewardTier, index: usize, field: &str, value: Value) -> Result<()> {
        self.with_list(&reward_list(tier, RewardKind::Items), |items| match items.get_mut(index) {
            Some(Value::Object(item)) => {
                item.insert(field.to_string(), value);
                Ok(())
            }
            _ => Err(EditorError::NotFound(format!("reward item {index}"))),
        })?
    }

    pub fn remove_reward_item(&mut self, tier: RewardTier, index: usize) -> Result<()> {
        self.with_list(&reward_list(tier, RewardKind::Items), |items| remove_at(items, index))?
            .map(|_| ())
    }

    /// Append an empty command. Returns its index.
    pub fn add_reward_command(&mut self, tier: RewardTier) -> Result<usize> {
        self.with_list(&reward_list(tier, RewardKind::Commands), |commands| {
            commands.push(json!(""));
            commands.len() - 1
        })
    }

    pub fn set_reward_command(&mut self, tier: RewardTier, index: usize, command: &str) -> Result<()> {
        self.with_list(&reward_list(tier, RewardKind::Commands), |commands| {
            match commands.get_mut(index) {
                Some(slot) => {
                    *slot = json!(command);
                    Ok(())
                }
                None => Err(EditorError::NotFound(format!("reward command {index}"))),
            }
        })?
    }

    pub fn remove_reward_command(&mut self, tier: RewardTier, index: usize) -> Result<()> {
        self.with_list(&reward_list(tier, RewardKind::Commands), |commands| {
            remove_at(commands, index)
        })?
        .map(|_| ())
    }
}
