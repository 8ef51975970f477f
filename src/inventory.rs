//! 36-slot inventory grid with drag-and-drop editing.
//!
//! Slots 0-8 are the hotbar, 9-35 the main inventory. Drags start either on
//! a filled grid slot or on the item palette; a drop resolves to one of the
//! [`DropOutcome`]s. Grid-to-grid drops never create or destroy items.

use crate::catalog;
use crate::error::{EditorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of slots in the grid.
pub const SLOT_COUNT: usize = 36;

/// Number of hotbar slots at the start of the grid.
pub const HOTBAR_SLOTS: usize = 9;

fn default_amount() -> u32 {
    1
}

/// One occupied slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub slot: usize,
    pub item: String,
    #[serde(default = "default_amount")]
    pub amount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchantments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fields this editor does not know about, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryEntry {
    pub fn new(slot: usize, item: impl Into<String>, amount: u32) -> Self {
        let item = item.into();
        let amount = catalog::clamp_amount(&item, amount);
        Self {
            slot,
            item,
            amount,
            enchantments: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// Move everything but the slot index from `other` into `self`.
    fn swap_payload(&mut self, other: &mut InventoryEntry) {
        std::mem::swap(&mut self.item, &mut other.item);
        std::mem::swap(&mut self.amount, &mut other.amount);
        std::mem::swap(&mut self.enchantments, &mut other.enchantments);
        std::mem::swap(&mut self.name, &mut other.name);
        std::mem::swap(&mut self.extra, &mut other.extra);
    }
}

/// Edits applied through the item detail form.
#[derive(Clone, Debug, Default)]
pub struct ItemEdit {
    pub amount: Option<u32>,
    /// `Some("")` clears the custom name.
    pub name: Option<String>,
    /// `NAME:LEVEL` strings; `Some(vec![])` clears enchantments.
    pub enchantments: Option<Vec<String>>,
}

/// Where the current drag started.
#[derive(Clone, Debug, PartialEq)]
pub enum DragSource {
    Slot { slot: usize, entry: InventoryEntry },
    Palette { item: String },
}

/// Result of dropping onto a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Palette item written into the slot (overwriting anything there).
    Inserted,
    /// Entry moved to an empty slot.
    Moved,
    /// Payloads of two filled slots exchanged.
    Swapped,
    /// Nothing changed.
    NoOp,
}

/// Inventory contents plus transient drag state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryGrid {
    entries: Vec<InventoryEntry>,
    drag: Option<DragSource>,
}

fn check_slot(slot: usize) -> Result<()> {
    if slot < SLOT_COUNT {
        Ok(())
    } else {
        Err(EditorError::InvalidSlot(slot))
    }
}

/// Validate a `NAME:LEVEL` enchantment string.
pub fn parse_enchantment(raw: &str) -> Option<(String, u8)> {
    let (name, level) = raw.trim().split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let level = level.trim().parse::<u8>().ok().filter(|l| *l > 0)?;
    Some((name.to_ascii_uppercase(), level))
}

impl InventoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inventory list. Out-of-range slots are dropped and a later
    /// entry for the same slot replaces an earlier one.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut grid = InventoryGrid::new();
        let Some(items) = value.as_array() else {
            return Ok(grid);
        };
        for item in items {
            let mut entry: InventoryEntry = serde_json::from_value(item.clone())?;
            if entry.slot >= SLOT_COUNT {
                tracing::warn!(slot = entry.slot, item = %entry.item, "dropping out-of-range inventory entry");
                continue;
            }
            entry.amount = catalog::clamp_amount(&entry.item, entry.amount);
            grid.put(entry);
        }
        Ok(grid)
    }

    /// Serialize back to a list ordered by slot.
    pub fn to_value(&self) -> Value {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| e.slot);
        serde_json::to_value(entries).unwrap_or_else(|_| Value::Array(Vec::new()))
    }

    pub fn get(&self, slot: usize) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.slot == slot)
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(item, amount)` pairs, sorted, for content comparisons.
    pub fn contents(&self) -> Vec<(String, u32)> {
        let mut pairs: Vec<(String, u32)> = self
            .entries
            .iter()
            .map(|e| (e.item.clone(), e.amount))
            .collect();
        pairs.sort();
        pairs
    }

    fn position(&self, slot: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.slot == slot)
    }

    /// Insert or overwrite the entry at `entry.slot`.
    fn put(&mut self, entry: InventoryEntry) {
        match self.position(entry.slot) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    // --- Drag and drop ---

    /// Start dragging the entry in `slot`. Returns false for an empty slot.
    pub fn pick_up(&mut self, slot: usize) -> Result<bool> {
        check_slot(slot)?;
        match self.get(slot).cloned() {
            Some(entry) => {
                self.drag = Some(DragSource::Slot { slot, entry });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Start dragging an item from the palette.
    pub fn pick_from_palette(&mut self, item: impl Into<String>) {
        self.drag = Some(DragSource::Palette { item: item.into() });
    }

    pub fn drag(&self) -> Option<&DragSource> {
        self.drag.as_ref()
    }

    /// Slot the current drag started from, for the "dragging" marker.
    pub fn dragging_from(&self) -> Option<usize> {
        match &self.drag {
            Some(DragSource::Slot { slot, .. }) => Some(*slot),
            _ => None,
        }
    }

    /// Drop outside any slot, or drag cancelled.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Drop the dragged item onto `target`.
    pub fn drop_on(&mut self, target: usize) -> Result<DropOutcome> {
        let Some(source) = self.drag.take() else {
            return Ok(DropOutcome::NoOp);
        };
        check_slot(target)?;

        let outcome = match source {
            DragSource::Palette { item } => {
                self.add_item_to_slot(target, &item, 1)?;
                DropOutcome::Inserted
            }
            DragSource::Slot { slot, .. } if slot == target => DropOutcome::NoOp,
            DragSource::Slot { slot, .. } => match (self.position(slot), self.position(target)) {
                (None, _) => DropOutcome::NoOp,
                (Some(from), Some(to)) => {
                    let (a, b) = if from < to {
                        let (left, right) = self.entries.split_at_mut(to);
                        (&mut left[from], &mut right[0])
                    } else {
                        let (left, right) = self.entries.split_at_mut(from);
                        (&mut right[0], &mut left[to])
                    };
                    a.swap_payload(b);
                    DropOutcome::Swapped
                }
                (Some(from), None) => {
                    self.entries[from].slot = target;
                    DropOutcome::Moved
                }
            },
        };

        tracing::debug!(target, ?outcome, "inventory drop");
        Ok(outcome)
    }

    // --- Direct edits ---

    /// Write `item` into `slot`, replacing what was there. The amount is
    /// clamped to the item's stack size. Returns the stored amount.
    pub fn add_item_to_slot(&mut self, slot: usize, item: &str, amount: u32) -> Result<u32> {
        check_slot(slot)?;
        let entry = InventoryEntry::new(slot, item, amount);
        let stored = entry.amount;
        self.put(entry);
        Ok(stored)
    }

    /// Add one `item`: top up a non-full stack of the same item, otherwise
    /// use the first empty slot. Returns the slot used.
    pub fn add_item(&mut self, item: &str) -> Result<usize> {
        let max = catalog::max_stack(item);
        if max > 1 {
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.item == item && e.amount < max)
            {
                entry.amount = (entry.amount + 1).min(max);
                return Ok(entry.slot);
            }
        }

        let slot = (0..SLOT_COUNT)
            .find(|s| self.position(*s).is_none())
            .ok_or(EditorError::InventoryFull)?;
        self.put(InventoryEntry::new(slot, item, 1));
        Ok(slot)
    }

    /// Apply the item detail form to the entry in `slot`.
    pub fn update_item(&mut self, slot: usize, edit: ItemEdit) -> Result<()> {
        check_slot(slot)?;
        let index = self
            .position(slot)
            .ok_or_else(|| EditorError::NotFound(format!("inventory slot {slot}")))?;
        let entry = &mut self.entries[index];

        if let Some(amount) = edit.amount {
            entry.amount = catalog::clamp_amount(&entry.item, amount);
        }
        if let Some(name) = edit.name {
            let name = name.trim().to_string();
            entry.name = if name.is_empty() { None } else { Some(name) };
        }
        if let Some(enchantments) = edit.enchantments {
            let parsed: Vec<String> = enchantments
                .iter()
                .filter_map(|raw| parse_enchantment(raw))
                .map(|(name, level)| format!("{name}:{level}"))
                .collect();
            entry.enchantments = if parsed.is_empty() { None } else { Some(parsed) };
        }
        Ok(())
    }

    pub fn remove(&mut self, slot: usize) -> Option<InventoryEntry> {
        let index = self.position(slot)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.drag = None;
    }
}
