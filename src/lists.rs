//! Projection of entity collections into cards and markup.
//!
//! Every view is computed straight from the live documents; nothing is
//! cached. Cards keep the insertion order of the underlying mapping.

use crate::document::{get_bool, get_i64, get_str, get_value};
use crate::i18n::Translations;
use crate::types::EntityKind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write;

/// Number of inventory items previewed on an equipment card.
const INVENTORY_PREVIEW: usize = 6;

/// Structured user action, keyed by entity id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ViewAction {
    Create { kind: EntityKind },
    Edit { kind: EntityKind, id: String },
    Delete { kind: EntityKind, id: String },
}

impl ViewAction {
    fn name(&self) -> &'static str {
        match self {
            ViewAction::Create { .. } => "create",
            ViewAction::Edit { .. } => "edit",
            ViewAction::Delete { .. } => "delete",
        }
    }

    fn kind(&self) -> EntityKind {
        match self {
            ViewAction::Create { kind }
            | ViewAction::Edit { kind, .. }
            | ViewAction::Delete { kind, .. } => *kind,
        }
    }

    /// `data-*` attributes identifying this action in markup.
    pub fn attributes(&self) -> String {
        let mut attrs = format!(
            "data-action=\"{}\" data-kind=\"{}\"",
            self.name(),
            self.kind()
        );
        if let ViewAction::Edit { id, .. } | ViewAction::Delete { id, .. } = self {
            let _ = write!(attrs, " data-id=\"{}\"", escape_html(id));
        }
        attrs
    }

    /// Inverse of [`attributes`](Self::attributes).
    pub fn parse(action: &str, kind: &str, id: Option<&str>) -> Option<Self> {
        let kind = match kind {
            "event" => EntityKind::Event,
            "world" => EntityKind::World,
            "equipment" => EntityKind::Equipment,
            _ => return None,
        };
        match (action, id) {
            ("create", _) => Some(ViewAction::Create { kind }),
            ("edit", Some(id)) => Some(ViewAction::Edit { kind, id: id.to_string() }),
            ("delete", Some(id)) => Some(ViewAction::Delete { kind, id: id.to_string() }),
            _ => None,
        }
    }
}

/// Either the empty-state placeholder or the cards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ListView<C> {
    Empty {
        message_key: &'static str,
        create_label_key: &'static str,
        create: ViewAction,
    },
    Cards { cards: Vec<C> },
}

impl<C> ListView<C> {
    pub fn is_empty_state(&self) -> bool {
        matches!(self, ListView::Empty { .. })
    }

    pub fn cards(&self) -> &[C] {
        match self {
            ListView::Cards { cards } => cards,
            ListView::Empty { .. } => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventCard {
    pub id: String,
    pub display_name: String,
    pub enabled: bool,
    pub command: String,
    pub description: Option<String>,
    pub min_players: i64,
    pub max_players: i64,
    pub countdown: i64,
    pub game_mode: String,
    pub pvp_enabled: bool,
    pub lobby_world: Option<String>,
    pub event_world: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldCard {
    pub id: String,
    pub display_name: String,
    pub pvp_wager_enabled: bool,
    pub build_allowed: bool,
    pub regenerate: bool,
    pub spawn_type: Option<String>,
    pub clone_source: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EquipmentCard {
    pub id: String,
    pub display_name: String,
    pub enabled: bool,
    pub description: Option<String>,
    /// `"all"` or a world list as written in the document.
    pub allowed_worlds: String,
    pub armor: Vec<String>,
    pub inventory_count: usize,
    pub inventory_preview: Vec<(String, u32)>,
    pub more_items: usize,
}

/// Counts shown on the navigation badges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavCounts {
    pub events: usize,
    pub worlds: usize,
    pub equipment: usize,
}

fn collection<'a>(doc: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    get_value(doc, key).and_then(Value::as_object)
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Nonzero integer leaf, else `default` (zero counts as unset).
fn count_or(config: &Value, path: &str, default: i64) -> i64 {
    match get_i64(config, path, 0) {
        0 => default,
        n => n,
    }
}

fn project<C>(
    doc: &Value,
    kind: EntityKind,
    message_key: &'static str,
    create_label_key: &'static str,
    card: impl Fn(&str, &Value) -> C,
) -> ListView<C> {
    match collection(doc, kind.collection()) {
        Some(map) if !map.is_empty() => ListView::Cards {
            cards: map
                .iter()
                .filter(|(_, v)| v.is_object())
                .map(|(id, v)| card(id, v))
                .collect(),
        },
        _ => ListView::Empty {
            message_key,
            create_label_key,
            create: ViewAction::Create { kind },
        },
    }
}

/// Event cards from the settings document.
pub fn events_view(settings: &Value) -> ListView<EventCard> {
    project(settings, EntityKind::Event, "label.noEvents", "button.createEvent", |id, config| {
        let worlds = config.get("worlds");
        EventCard {
            id: id.to_string(),
            display_name: non_empty(config.get("display-name")).unwrap_or_else(|| id.to_string()),
            enabled: get_bool(config, "enabled", true),
            command: non_empty(config.get("command")).unwrap_or_else(|| id.to_string()),
            description: non_empty(config.get("description")),
            min_players: count_or(config, "min-players", 2),
            max_players: count_or(config, "max-players", 20),
            countdown: count_or(config, "countdown-time", 30),
            game_mode: get_str(config, "mechanics.game-mode", "SOLO").to_string(),
            pvp_enabled: get_bool(config, "mechanics.pvp-enabled", true),
            lobby_world: non_empty(worlds.and_then(|w| w.get("lobby-world"))),
            event_world: non_empty(worlds.and_then(|w| w.get("event-world"))),
        }
    })
}

/// World cards from the worlds document.
pub fn worlds_view(worlds: &Value) -> ListView<WorldCard> {
    project(worlds, EntityKind::World, "label.noWorlds", "button.createWorld", |id, config| {
        WorldCard {
            id: id.to_string(),
            display_name: non_empty(config.get("display-name")).unwrap_or_else(|| id.to_string()),
            pvp_wager_enabled: config.get("pvpwager-world-enable") == Some(&Value::Bool(true)),
            build_allowed: config.get("build-allowed") == Some(&Value::Bool(true)),
            regenerate: config.get("regenerate-world") == Some(&Value::Bool(true)),
            spawn_type: non_empty(get_value(config, "pvpwager-spawn.spawn-type")),
            clone_source: non_empty(config.get("clone-source-world")),
        }
    })
}

/// Equipment cards from the equipment document.
pub fn equipment_view(equipment: &Value) -> ListView<EquipmentCard> {
    project(
        equipment,
        EntityKind::Equipment,
        "label.noEquipment",
        "button.createEquipment",
        |id, config| {
            let armor = ["helmet", "chestplate", "leggings", "boots"]
                .iter()
                .filter_map(|piece| non_empty(get_value(config, &format!("armor.{piece}"))))
                .collect();
            let inventory = config
                .get("inventory")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let allowed_worlds = match config.get("allowed-pvpwager-worlds") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Array(list)) if !list.is_empty() => list
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => "all".to_string(),
            };

            EquipmentCard {
                id: id.to_string(),
                display_name: non_empty(config.get("display-name")).unwrap_or_else(|| id.to_string()),
                enabled: get_bool(config, "enabled", true),
                description: non_empty(config.get("description")),
                allowed_worlds,
                armor,
                inventory_count: inventory.len(),
                inventory_preview: inventory
                    .iter()
                    .take(INVENTORY_PREVIEW)
                    .map(|item| {
                        let amount = item.get("amount").and_then(Value::as_u64).unwrap_or(1);
                        (get_str(item, "item", "").to_string(), amount as u32)
                    })
                    .collect(),
                more_items: inventory.len().saturating_sub(INVENTORY_PREVIEW),
            }
        },
    )
}

pub fn nav_counts(settings: &Value, worlds: &Value, equipment: &Value) -> NavCounts {
    let count = |doc: &Value, kind: EntityKind| collection(doc, kind.collection()).map_or(0, Map::len);
    NavCounts {
        events: count(settings, EntityKind::Event),
        worlds: count(worlds, EntityKind::World),
        equipment: count(equipment, EntityKind::Equipment),
    }
}

/// `DIAMOND_SWORD` -> `Diamond Sword`.
pub fn format_item_name(item: &str) -> String {
    item.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_game_mode(mode: &str, tr: &Translations) -> String {
    let key = match mode {
        "SOLO" => "gameMode.solo",
        "TEAM_2" => "gameMode.team2",
        "TEAM_3" => "gameMode.team3",
        "TEAM_4" => "gameMode.team4",
        "FFA" => "gameMode.ffa",
        other => return other.to_string(),
    };
    tr.t(key)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for one card.
pub trait CardMarkup {
    fn to_markup(&self, tr: &Translations) -> String;
}

fn card_header(out: &mut String, kind: EntityKind, id: &str, title: &str, badge: &str) {
    let edit = ViewAction::Edit { kind, id: id.to_string() };
    let delete = ViewAction::Delete { kind, id: id.to_string() };
    let _ = write!(
        out,
        "<div class=\"card\" data-id=\"{id}\"><div class=\"card-header\"><div class=\"card-title\"><span>{title}</span>{badge}</div>\
         <div class=\"card-actions\"><button {edit}></button><button {delete}></button></div></div>",
        id = escape_html(id),
        title = escape_html(title),
        edit = edit.attributes(),
        delete = delete.attributes(),
    );
}

fn badge(class: &str, text: &str) -> String {
    format!("<span class=\"badge badge-{class}\">{}</span>", escape_html(text))
}

impl CardMarkup for EventCard {
    fn to_markup(&self, tr: &Translations) -> String {
        let mut out = String::new();
        let state = if self.enabled {
            badge("success", &tr.t("card.active"))
        } else {
            badge("warning", &tr.t("card.inactive"))
        };
        card_header(&mut out, EntityKind::Event, &self.id, &self.display_name, &state);

        let description = self
            .description
            .clone()
            .unwrap_or_else(|| tr.t("card.noDescription"));
        let pvp = if self.pvp_enabled { tr.t("card.pvpOn") } else { tr.t("card.pvpOff") };
        let _ = write!(
            out,
            "<div class=\"card-body\"><code>{id}</code><span>/event {command}</span><p>{description}</p>\
             <dl><dt>{players}</dt><dd>{min} - {max}</dd><dt>{countdown_label}</dt><dd>{countdown}s</dd>\
             <dt>{mode_label}</dt><dd>{mode}</dd><dt>{pvp_label}</dt><dd>{pvp}</dd></dl>",
            id = escape_html(&self.id),
            command = escape_html(&self.command),
            description = escape_html(&description),
            players = escape_html(&tr.t("card.players")),
            min = self.min_players,
            max = self.max_players,
            countdown_label = escape_html(&tr.t("card.countdown")),
            countdown = self.countdown,
            mode_label = escape_html(&tr.t("card.mode")),
            mode = escape_html(&format_game_mode(&self.game_mode, tr)),
            pvp_label = escape_html(&tr.t("card.pvp")),
            pvp = escape_html(&pvp),
        );
        for world in [&self.lobby_world, &self.event_world].into_iter().flatten() {
            let _ = write!(out, "<span class=\"world\">{}</span>", escape_html(world));
        }
        out.push_str("</div></div>");
        out
    }
}

impl CardMarkup for WorldCard {
    fn to_markup(&self, tr: &Translations) -> String {
        let mut out = String::new();
        let state = if self.pvp_wager_enabled {
            badge("error", &tr.t("card.pvpActive"))
        } else {
            badge("info", &tr.t("card.eventWorld"))
        };
        card_header(&mut out, EntityKind::World, &self.id, &self.display_name, &state);

        let flag = |on: bool, yes: &str, no: &str| escape_html(&tr.t(if on { yes } else { no }));
        let spawn_type = self
            .spawn_type
            .clone()
            .unwrap_or_else(|| tr.t("card.notDefined"));
        let _ = write!(
            out,
            "<div class=\"card-body\"><code>{id}</code><dl><dt>{pvp_label}</dt><dd>{pvp}</dd>\
             <dt>{build_label}</dt><dd>{build}</dd><dt>{regen_label}</dt><dd>{regen}</dd>\
             <dt>{spawn_label}</dt><dd>{spawn}</dd></dl>",
            id = escape_html(&self.id),
            pvp_label = escape_html(&tr.t("card.pvpWorld")),
            pvp = flag(self.pvp_wager_enabled, "card.enabled", "card.disabled"),
            build_label = escape_html(&tr.t("card.building")),
            build = flag(self.build_allowed, "card.allowed", "card.forbidden"),
            regen_label = escape_html(&tr.t("card.regeneration")),
            regen = flag(self.regenerate, "card.active", "card.inactive"),
            spawn_label = escape_html(&tr.t("card.spawnType")),
            spawn = escape_html(&spawn_type),
        );
        if let Some(source) = &self.clone_source {
            let _ = write!(out, "<code class=\"clone-source\">{}</code>", escape_html(source));
        }
        out.push_str("</div></div>");
        out
    }
}

impl CardMarkup for EquipmentCard {
    fn to_markup(&self, tr: &Translations) -> String {
        let mut out = String::new();
        let state = if self.enabled {
            badge("success", &tr.t("card.active"))
        } else {
            badge("warning", &tr.t("card.inactive"))
        };
        card_header(&mut out, EntityKind::Equipment, &self.id, &self.display_name, &state);

        let worlds = if self.allowed_worlds == "all" {
            tr.t("card.allWorlds")
        } else {
            self.allowed_worlds.clone()
        };
        let _ = write!(
            out,
            "<div class=\"card-body\"><code>{}</code><span class=\"worlds\">{}</span>",
            escape_html(&self.id),
            escape_html(&worlds)
        );
        if let Some(description) = &self.description {
            let _ = write!(out, "<p>{}</p>", escape_html(description));
        }

        let _ = write!(
            out,
            "<p>{} ({}/4)</p>",
            escape_html(&tr.t("card.armor")),
            self.armor.len()
        );
        if self.armor.is_empty() {
            let _ = write!(out, "<span>{}</span>", escape_html(&tr.t("card.noArmor")));
        }
        for piece in &self.armor {
            out.push_str(&badge("info", &format_item_name(piece)));
        }

        let _ = write!(
            out,
            "<p>{} ({} {})</p>",
            escape_html(&tr.t("card.inventory")),
            self.inventory_count,
            escape_html(&tr.t("card.items"))
        );
        if self.inventory_count == 0 {
            let _ = write!(out, "<span>{}</span>", escape_html(&tr.t("card.emptyInventory")));
        }
        for (item, amount) in &self.inventory_preview {
            let label = if *amount > 1 {
                format!("{} x{}", format_item_name(item), amount)
            } else {
                format_item_name(item)
            };
            out.push_str(&badge("success", &label));
        }
        if self.more_items > 0 {
            let more = tr.t_with("card.more", &[("count", &self.more_items.to_string())]);
            out.push_str(&badge("warning", &more));
        }
        out.push_str("</div></div>");
        out
    }
}

impl<C: CardMarkup> ListView<C> {
    pub fn to_markup(&self, tr: &Translations) -> String {
        match self {
            ListView::Empty {
                message_key,
                create_label_key,
                create,
            } => format!(
                "<div class=\"list-empty\"><p>{}</p><button class=\"btn btn-primary\" {}>{}</button></div>",
                escape_html(&tr.t(message_key)),
                create.attributes(),
                escape_html(&tr.t(create_label_key)),
            ),
            ListView::Cards { cards } => cards.iter().map(|c| c.to_markup(tr)).collect(),
        }
    }
}
