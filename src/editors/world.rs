//! World editor.

use super::event::check_id;
use super::{spawn_point, EntitySchema, ModalEditor, Scratch};
use crate::error::Result;
use crate::i18n::Translations;
use crate::types::EntityKind;
use serde_json::{json, Value};

pub struct WorldSchema;

fn fixed_spawns() -> Value {
    json!({
        "spectator": spawn_point(0.0, 80.0, 0.0, 0.0, 0.0),
        "player1": spawn_point(10.0, 64.0, 0.0, 90.0, 0.0),
        "player2": spawn_point(-10.0, 64.0, 0.0, -90.0, 0.0)
    })
}

impl EntitySchema for WorldSchema {
    const KIND: EntityKind = EntityKind::World;
    const SAVED_KEY: &'static str = "worlds.saved";
    const KEEPS_ID: bool = false;
    type Workspace = ();

    fn template(tr: &Translations) -> Value {
        json!({
            "display-name": tr.t_or("editor.newWorld", "New World"),
            "pvpwager-world-enable": true,
            "build-allowed": false,
            "regenerate-world": false,
            "clone-source-world": "",
            "pvpwager-spawn": {
                "spawn-type": "FIXED_SPAWNS",
                "spawns": fixed_spawns()
            },
            "allowed-equipment-groups": ["all"]
        })
    }

    fn open_defaults(tr: &Translations) -> Value {
        json!({
            "display-name": tr.t_or("editor.newWorld", "New World"),
            "pvpwager-world-enable": false,
            "pvpwager-spawn": {"spawn-type": "FIXED_SPAWNS", "spawns": {}}
        })
    }

    fn validate(scratch: &Scratch) -> Result<()> {
        check_id(&scratch.id, "label.worldIdEmpty")
    }
}

/// Spawn layouts for PvP wager worlds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldSpawnType {
    FixedSpawns,
    RandomRadius,
    RandomArea,
}

impl WorldSpawnType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorldSpawnType::FixedSpawns => "FIXED_SPAWNS",
            WorldSpawnType::RandomRadius => "RANDOM_RADIUS",
            WorldSpawnType::RandomArea => "RANDOM_AREA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FIXED_SPAWNS" => Some(WorldSpawnType::FixedSpawns),
            "RANDOM_RADIUS" => Some(WorldSpawnType::RandomRadius),
            "RANDOM_AREA" => Some(WorldSpawnType::RandomArea),
            _ => None,
        }
    }

    fn default_spawns(self) -> Value {
        match self {
            WorldSpawnType::FixedSpawns => fixed_spawns(),
            WorldSpawnType::RandomRadius => json!({
                "center": {"x": 0, "y": 64, "z": 0},
                "radius": 20
            }),
            WorldSpawnType::RandomArea => json!({
                "min": {"x": -50, "y": 64, "z": -50},
                "max": {"x": 50, "y": 64, "z": 50}
            }),
        }
    }
}

impl ModalEditor<WorldSchema> {
    pub fn spawn_type(&self) -> Option<WorldSpawnType> {
        self.get("pvpwager-spawn.spawn-type")
            .and_then(Value::as_str)
            .and_then(WorldSpawnType::parse)
    }

    /// Switch spawn type. The spawn table is reset to the type's defaults.
    pub fn set_spawn_type(&mut self, spawn_type: WorldSpawnType) -> Result<()> {
        self.with_object("pvpwager-spawn", |spawn| {
            spawn.insert("spawn-type".into(), json!(spawn_type.as_str()));
            spawn.insert("spawns".into(), spawn_type.default_spawns());
        })
    }

    pub fn set_spawn_coord(&mut self, spawn: &str, coord: &str, value: f64) -> Result<()> {
        self.set(&format!("pvpwager-spawn.spawns.{spawn}.{coord}"), json!(value))
    }

    pub fn set_spawn_radius(&mut self, radius: f64) -> Result<()> {
        self.set("pvpwager-spawn.spawns.radius", json!(radius))
    }

    pub fn equipment_groups(&self) -> Vec<String> {
        self.get("allowed-equipment-groups")
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add a group tag. Returns false for blanks and duplicates.
    pub fn add_equipment_group(&mut self, group: &str) -> Result<bool> {
        let group = group.trim();
        if group.is_empty() {
            return Ok(false);
        }
        self.with_list("allowed-equipment-groups", |groups| {
            if groups.iter().any(|g| g.as_str() == Some(group)) {
                false
            } else {
                groups.push(json!(group));
                true
            }
        })
    }

    pub fn remove_equipment_group(&mut self, group: &str) -> Result<()> {
        self.with_list("allowed-equipment-groups", |groups| {
            groups.retain(|g| g.as_str() != Some(group));
        })
    }
}
