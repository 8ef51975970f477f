//! Equipment set editor: armor slots, offhand and the inventory grid.

use super::event::check_id;
use super::{EntitySchema, ModalEditor, Scratch, Workspace};
use crate::catalog::ArmorSlot;
use crate::error::{EditorError, Result};
use crate::i18n::Translations;
use crate::inventory::{parse_enchantment, InventoryGrid};
use crate::types::EntityKind;
use serde_json::{json, Map, Value};

pub struct EquipmentSchema;

/// Inventory grid and armor slot selection of the open equipment set.
#[derive(Clone, Debug, Default)]
pub struct EquipmentWorkspace {
    pub grid: InventoryGrid,
    pub selected_slot: Option<ArmorSlot>,
}

impl Workspace for EquipmentWorkspace {
    fn load(data: &Value) -> Result<Self> {
        let grid = match data.get("inventory") {
            Some(inventory) => InventoryGrid::from_value(inventory)?,
            None => InventoryGrid::new(),
        };
        Ok(Self {
            grid,
            selected_slot: None,
        })
    }

    fn store(&self, data: &mut Value) {
        if let Value::Object(map) = data {
            map.insert("inventory".into(), self.grid.to_value());
        }
    }
}

impl EntitySchema for EquipmentSchema {
    const KIND: EntityKind = EntityKind::Equipment;
    const SAVED_KEY: &'static str = "equipment.saved";
    const KEEPS_ID: bool = false;
    type Workspace = EquipmentWorkspace;

    fn template(tr: &Translations) -> Value {
        json!({
            "enabled": true,
            "display-name": tr.t_or("editor.newEquipment", "New Equipment Set"),
            "allowed-pvpwager-worlds": "all",
            "armor": {"helmet": null, "chestplate": null, "leggings": null, "boots": null},
            "offhand": null,
            "inventory": []
        })
    }

    fn open_defaults(tr: &Translations) -> Value {
        json!({
            "display-name": tr.t_or("editor.newEquipment", "New Equipment Set"),
            "enabled": true,
            "allowed-pvpwager-worlds": "all",
            "armor": {},
            "inventory": []
        })
    }

    fn validate(scratch: &Scratch) -> Result<()> {
        check_id(&scratch.id, "error.fieldRequired")
    }
}

fn item_path(slot: ArmorSlot) -> String {
    match slot {
        ArmorSlot::Offhand => "offhand".to_string(),
        other => format!("armor.{}", other.key()),
    }
}

fn details_path(slot: ArmorSlot) -> String {
    match slot {
        ArmorSlot::Offhand => "offhandData".to_string(),
        other => format!("armorData.{}", other.key()),
    }
}

impl ModalEditor<EquipmentSchema> {
    pub fn select_armor_slot(&mut self, slot: ArmorSlot) -> Result<()> {
        self.workspace_mut()?.selected_slot = Some(slot);
        Ok(())
    }

    pub fn selected_armor_slot(&self) -> Option<ArmorSlot> {
        self.workspace().selected_slot
    }

    pub fn armor_item(&self, slot: ArmorSlot) -> Option<&str> {
        self.get(&item_path(slot)).and_then(Value::as_str)
    }

    /// Put `item` into its natural slot, or the selected slot for items
    /// that fit anywhere. Returns the slot used.
    pub fn set_armor_item(&mut self, item: &str) -> Result<ArmorSlot> {
        let natural = ArmorSlot::for_item(item);
        let workspace = self.workspace_mut()?;
        if natural.is_some() {
            workspace.selected_slot = natural;
        }
        let slot = workspace
            .selected_slot
            .ok_or_else(|| EditorError::validation("label.selectSlotFirst"))?;
        if !slot.accepts(item) {
            return Err(EditorError::validation("label.itemWrongSlot"));
        }

        self.set(&item_path(slot), json!(item))?;
        tracing::debug!(slot = slot.key(), item, "armor item set");
        Ok(slot)
    }

    /// Custom name and enchantments of a filled armor or offhand slot.
    pub fn set_armor_details(
        &mut self,
        slot: ArmorSlot,
        name: Option<&str>,
        enchantments: &[String],
    ) -> Result<()> {
        let item = self
            .armor_item(slot)
            .map(str::to_string)
            .ok_or_else(|| EditorError::NotFound(format!("{} item", slot.key())))?;

        let mut details = Map::new();
        details.insert("item".into(), json!(item));
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        details.insert("name".into(), name.map_or(Value::Null, |n| json!(n)));
        let enchantments: Vec<String> = enchantments
            .iter()
            .filter_map(|raw| parse_enchantment(raw))
            .map(|(name, level)| format!("{name}:{level}"))
            .collect();
        if !enchantments.is_empty() {
            details.insert("enchantments".into(), json!(enchantments));
        }

        self.set(&details_path(slot), Value::Object(details))
    }

    /// Clear a slot together with its details.
    pub fn remove_armor_item(&mut self, slot: ArmorSlot) -> Result<()> {
        self.remove(&item_path(slot))?;
        self.remove(&details_path(slot))?;
        Ok(())
    }

    pub fn inventory(&self) -> &InventoryGrid {
        &self.workspace().grid
    }

    pub fn inventory_mut(&mut self) -> Result<&mut InventoryGrid> {
        Ok(&mut self.workspace_mut()?.grid)
    }

    /// Add one `item` to the grid. Returns the slot used.
    pub fn add_item_to_inventory(&mut self, item: &str) -> Result<usize> {
        self.inventory_mut()?.add_item(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::EquipmentEditor;
    use crate::inventory::DropOutcome;
    use crate::types::ChangeOp;

    fn open_archer() -> EquipmentEditor {
        let equipment = json!({"equipment-sets": {"archer": {
            "display-name": "Archer",
            "armor": {"helmet": "LEATHER_HELMET"},
            "inventory": [{"slot": 0, "item": "BOW"}, {"slot": 1, "item": "ARROW", "amount": 32}]
        }}});
        let mut editor = EquipmentEditor::new();
        editor
            .open_existing(&equipment, "archer", &Translations::default())
            .unwrap();
        editor
    }

    #[test]
    fn test_save_requires_id() {
        let mut editor = EquipmentEditor::new();
        editor.open_new(&Translations::default());
        let err = editor.save().unwrap_err();
        assert!(matches!(err, EditorError::Validation { ref key } if key == "error.fieldRequired"));
        assert!(editor.is_open());
    }

    #[test]
    fn test_inventory_edits_are_saved() {
        let mut editor = open_archer();
        assert_eq!(editor.inventory().len(), 2);

        let grid = editor.inventory_mut().unwrap();
        grid.pick_from_palette("GOLDEN_APPLE");
        assert_eq!(grid.drop_on(5).unwrap(), DropOutcome::Inserted);
        assert_eq!(editor.add_item_to_inventory("ARROW").unwrap(), 1);

        let record = editor.save().unwrap();
        assert_eq!(record.path, "equipment-sets.archer");
        let ChangeOp::Set { value } = record.op else {
            panic!("expected set");
        };
        assert!(value.get("id").is_none());
        let inventory = value["inventory"].as_array().unwrap();
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory[1]["amount"], 33);
        assert_eq!(inventory[2]["item"], "GOLDEN_APPLE");
    }

    #[test]
    fn test_armor_slot_detection() {
        let mut editor = open_archer();

        assert_eq!(editor.set_armor_item("IRON_BOOTS").unwrap(), ArmorSlot::Boots);
        assert_eq!(editor.armor_item(ArmorSlot::Boots), Some("IRON_BOOTS"));
        assert_eq!(editor.selected_armor_slot(), Some(ArmorSlot::Boots));

        // Items without a natural slot go into the selected one.
        editor.select_armor_slot(ArmorSlot::Offhand).unwrap();
        assert_eq!(editor.set_armor_item("TORCH").unwrap(), ArmorSlot::Offhand);
        assert_eq!(editor.armor_item(ArmorSlot::Offhand), Some("TORCH"));
    }

    #[test]
    fn test_armor_requires_selected_slot() {
        let mut editor = EquipmentEditor::new();
        editor.open_new(&Translations::default());
        let err = editor.set_armor_item("TORCH").unwrap_err();
        assert!(matches!(err, EditorError::Validation { ref key } if key == "label.selectSlotFirst"));
    }

    #[test]
    fn test_armor_details_and_removal() {
        let mut editor = open_archer();
        editor
            .set_armor_details(
                ArmorSlot::Helmet,
                Some("  Hood "),
                &["protection:4".to_string(), "junk".to_string()],
            )
            .unwrap();
        assert_eq!(
            editor.get("armorData.helmet"),
            Some(&json!({"item": "LEATHER_HELMET", "name": "Hood", "enchantments": ["PROTECTION:4"]}))
        );

        assert!(editor.set_armor_details(ArmorSlot::Chestplate, None, &[]).is_err());

        editor.remove_armor_item(ArmorSlot::Helmet).unwrap();
        assert!(editor.armor_item(ArmorSlot::Helmet).is_none());
        assert!(editor.get("armorData.helmet").is_none());
    }
}
