//! Drag-and-drop behavior of the inventory grid.

use eventpvp_config::inventory::{InventoryGrid, SLOT_COUNT};
use eventpvp_config::{DropOutcome, EditorError};
use proptest::prelude::*;
use serde_json::json;

fn starter_grid() -> InventoryGrid {
    InventoryGrid::from_value(&json!([
        {"slot": 0, "item": "DIAMOND_SWORD", "amount": 1, "enchantments": ["SHARPNESS:5"]},
        {"slot": 1, "item": "ARROW", "amount": 64},
        {"slot": 5, "item": "ENDER_PEARL", "amount": 16, "name": "Escape"},
        {"slot": 30, "item": "GOLDEN_APPLE", "amount": 3}
    ]))
    .unwrap()
}

proptest! {
    /// Grid-to-grid drops never create or destroy items.
    #[test]
    fn prop_grid_drops_preserve_contents(
        moves in prop::collection::vec((0..SLOT_COUNT, 0..SLOT_COUNT), 0..50),
    ) {
        let mut grid = starter_grid();
        let before = grid.contents();

        for (from, to) in moves {
            if grid.pick_up(from).unwrap() {
                grid.drop_on(to).unwrap();
            }
            prop_assert_eq!(grid.contents(), before.clone());
            prop_assert!(grid.drag().is_none());
        }

        let mut slots: Vec<usize> = grid.entries().iter().map(|e| e.slot).collect();
        slots.sort_unstable();
        slots.dedup();
        prop_assert_eq!(slots.len(), grid.len());
    }
}

#[test]
fn test_swap_keeps_slot_positions() {
    let mut grid = starter_grid();
    assert!(grid.pick_up(0).unwrap());
    assert_eq!(grid.drop_on(5).unwrap(), DropOutcome::Swapped);

    let pearl = grid.get(0).unwrap();
    assert_eq!(pearl.item, "ENDER_PEARL");
    assert_eq!(pearl.name.as_deref(), Some("Escape"));
    let sword = grid.get(5).unwrap();
    assert_eq!(sword.item, "DIAMOND_SWORD");
    assert_eq!(sword.enchantments, Some(vec!["SHARPNESS:5".to_string()]));
}

#[test]
fn test_move_to_empty_slot() {
    let mut grid = starter_grid();
    grid.pick_up(30).unwrap();
    assert_eq!(grid.dragging_from(), Some(30));
    assert_eq!(grid.drop_on(8).unwrap(), DropOutcome::Moved);
    assert!(grid.get(30).is_none());
    assert_eq!(grid.get(8).unwrap().amount, 3);
}

#[test]
fn test_drop_on_same_slot_is_noop() {
    let mut grid = starter_grid();
    grid.pick_up(1).unwrap();
    assert_eq!(grid.drop_on(1).unwrap(), DropOutcome::NoOp);
    assert_eq!(grid.drop_on(2).unwrap(), DropOutcome::NoOp);
    assert_eq!(grid, starter_grid());
}

#[test]
fn test_palette_drop_overwrites() {
    let mut grid = starter_grid();
    grid.pick_from_palette("BOW");
    assert_eq!(grid.drop_on(1).unwrap(), DropOutcome::Inserted);
    let slot = grid.get(1).unwrap();
    assert_eq!((slot.item.as_str(), slot.amount), ("BOW", 1));
    assert_eq!(grid.len(), 4);
}

#[test]
fn test_cancelled_drag_changes_nothing() {
    let mut grid = starter_grid();
    grid.pick_up(0).unwrap();
    grid.cancel_drag();
    assert_eq!(grid.drop_on(10).unwrap(), DropOutcome::NoOp);
    assert_eq!(grid.get(0).unwrap().item, "DIAMOND_SWORD");
}

#[test]
fn test_out_of_range_slot() {
    let mut grid = starter_grid();
    assert!(matches!(grid.pick_up(SLOT_COUNT), Err(EditorError::InvalidSlot(36))));
    grid.pick_from_palette("BOW");
    assert!(matches!(grid.drop_on(99), Err(EditorError::InvalidSlot(99))));
}

#[test]
fn test_amounts_clamped_to_stack_size() {
    let mut grid = InventoryGrid::new();
    assert_eq!(grid.add_item_to_slot(0, "ENDER_PEARL", 64).unwrap(), 16);
    assert_eq!(grid.add_item_to_slot(1, "DIAMOND_SWORD", 5).unwrap(), 1);
    assert_eq!(grid.add_item_to_slot(2, "STONE", 0).unwrap(), 1);
    assert_eq!(grid.add_item_to_slot(3, "STONE", 200).unwrap(), 64);
}

#[test]
fn test_add_item_tops_up_stacks() {
    let mut grid = InventoryGrid::new();
    grid.add_item_to_slot(4, "SNOWBALL", 15).unwrap();
    assert_eq!(grid.add_item("SNOWBALL").unwrap(), 4);
    assert_eq!(grid.get(4).unwrap().amount, 16);
    // Full stack: next one opens a new slot.
    assert_eq!(grid.add_item("SNOWBALL").unwrap(), 0);
}
