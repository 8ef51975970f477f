//! Static Minecraft item and enchantment reference data.

use serde::Serialize;

/// Palette categories shown next to the inventory grid.
pub const ITEM_CATEGORIES: &[(&str, &[&str])] = &[
    ("swords", &["WOODEN_SWORD", "STONE_SWORD", "IRON_SWORD", "GOLDEN_SWORD", "DIAMOND_SWORD", "NETHERITE_SWORD"]),
    ("axes", &["WOODEN_AXE", "STONE_AXE", "IRON_AXE", "GOLDEN_AXE", "DIAMOND_AXE", "NETHERITE_AXE"]),
    ("pickaxes", &["WOODEN_PICKAXE", "STONE_PICKAXE", "IRON_PICKAXE", "GOLDEN_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("helmets", &["LEATHER_HELMET", "CHAINMAIL_HELMET", "IRON_HELMET", "GOLDEN_HELMET", "DIAMOND_HELMET", "NETHERITE_HELMET", "TURTLE_HELMET"]),
    ("chestplates", &["LEATHER_CHESTPLATE", "CHAINMAIL_CHESTPLATE", "IRON_CHESTPLATE", "GOLDEN_CHESTPLATE", "DIAMOND_CHESTPLATE", "NETHERITE_CHESTPLATE", "ELYTRA"]),
    ("leggings", &["LEATHER_LEGGINGS", "CHAINMAIL_LEGGINGS", "IRON_LEGGINGS", "GOLDEN_LEGGINGS", "DIAMOND_LEGGINGS", "NETHERITE_LEGGINGS"]),
    ("boots", &["LEATHER_BOOTS", "CHAINMAIL_BOOTS", "IRON_BOOTS", "GOLDEN_BOOTS", "DIAMOND_BOOTS", "NETHERITE_BOOTS"]),
    ("bows", &["BOW", "CROSSBOW", "TRIDENT"]),
    ("food", &["APPLE", "GOLDEN_APPLE", "ENCHANTED_GOLDEN_APPLE", "BREAD", "COOKED_BEEF", "COOKED_PORKCHOP", "COOKED_CHICKEN", "COOKED_SALMON", "COOKED_MUTTON", "COOKED_COD", "GOLDEN_CARROT", "PUMPKIN_PIE"]),
    ("potions", &["POTION", "SPLASH_POTION", "LINGERING_POTION"]),
    ("utility", &["SHIELD", "TOTEM_OF_UNDYING", "ENDER_PEARL", "CHORUS_FRUIT", "FIREWORK_ROCKET"]),
    ("projectiles", &["ARROW", "SPECTRAL_ARROW", "TIPPED_ARROW", "SNOWBALL", "EGG"]),
    ("blocks", &["COBBLESTONE", "DIRT", "OAK_PLANKS", "OBSIDIAN", "WATER_BUCKET", "LAVA_BUCKET", "TNT", "END_CRYSTAL"]),
    ("misc", &["FISHING_ROD", "FLINT_AND_STEEL", "COMPASS", "CLOCK", "NAME_TAG", "LEAD"]),
];

/// Items that never stack.
const UNSTACKABLE: &[&str] = &[
    "WOODEN_SWORD", "STONE_SWORD", "IRON_SWORD", "GOLDEN_SWORD", "DIAMOND_SWORD", "NETHERITE_SWORD",
    "WOODEN_AXE", "STONE_AXE", "IRON_AXE", "GOLDEN_AXE", "DIAMOND_AXE", "NETHERITE_AXE",
    "BOW", "CROSSBOW", "TRIDENT",
    "WOODEN_PICKAXE", "STONE_PICKAXE", "IRON_PICKAXE", "GOLDEN_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE",
    "WOODEN_SHOVEL", "STONE_SHOVEL", "IRON_SHOVEL", "GOLDEN_SHOVEL", "DIAMOND_SHOVEL", "NETHERITE_SHOVEL",
    "WOODEN_HOE", "STONE_HOE", "IRON_HOE", "GOLDEN_HOE", "DIAMOND_HOE", "NETHERITE_HOE",
    "FISHING_ROD", "FLINT_AND_STEEL", "SHEARS",
    "LEATHER_HELMET", "CHAINMAIL_HELMET", "IRON_HELMET", "GOLDEN_HELMET", "DIAMOND_HELMET", "NETHERITE_HELMET", "TURTLE_HELMET",
    "LEATHER_CHESTPLATE", "CHAINMAIL_CHESTPLATE", "IRON_CHESTPLATE", "GOLDEN_CHESTPLATE", "DIAMOND_CHESTPLATE", "NETHERITE_CHESTPLATE", "ELYTRA",
    "LEATHER_LEGGINGS", "CHAINMAIL_LEGGINGS", "IRON_LEGGINGS", "GOLDEN_LEGGINGS", "DIAMOND_LEGGINGS", "NETHERITE_LEGGINGS",
    "LEATHER_BOOTS", "CHAINMAIL_BOOTS", "IRON_BOOTS", "GOLDEN_BOOTS", "DIAMOND_BOOTS", "NETHERITE_BOOTS",
    "SHIELD", "TOTEM_OF_UNDYING", "CARROT_ON_A_STICK", "WARPED_FUNGUS_ON_A_STICK",
];

/// Items that stack to 16.
const STACK_16: &[&str] = &["ENDER_PEARL", "SNOWBALL", "EGG", "HONEY_BOTTLE", "ENDER_EYE"];

/// Maximum stack size for an item id (case-insensitive).
pub fn max_stack(item: &str) -> u32 {
    let item = item.to_ascii_uppercase();
    if UNSTACKABLE.contains(&item.as_str()) {
        1
    } else if STACK_16.contains(&item.as_str()) {
        16
    } else {
        64
    }
}

/// Clamp `amount` into `[1, max_stack(item)]`.
pub fn clamp_amount(item: &str, amount: u32) -> u32 {
    amount.clamp(1, max_stack(item))
}

/// Equipment slot outside the main inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorSlot {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
    Offhand,
}

impl ArmorSlot {
    pub const ALL: [ArmorSlot; 5] = [
        ArmorSlot::Helmet,
        ArmorSlot::Chestplate,
        ArmorSlot::Leggings,
        ArmorSlot::Boots,
        ArmorSlot::Offhand,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ArmorSlot::Helmet => "helmet",
            ArmorSlot::Chestplate => "chestplate",
            ArmorSlot::Leggings => "leggings",
            ArmorSlot::Boots => "boots",
            ArmorSlot::Offhand => "offhand",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ArmorSlot::ALL.into_iter().find(|slot| slot.key() == s)
    }

    /// Slot an item naturally belongs in, if any.
    pub fn for_item(item: &str) -> Option<Self> {
        let name = item.to_ascii_uppercase();
        let has = |needle: &str| name.contains(needle);
        if has("HELMET") || has("CAP") || has("HEAD") {
            Some(ArmorSlot::Helmet)
        } else if has("CHESTPLATE") || has("TUNIC") || has("ELYTRA") {
            Some(ArmorSlot::Chestplate)
        } else if has("LEGGINGS") || has("PANTS") {
            Some(ArmorSlot::Leggings)
        } else if has("BOOTS") {
            Some(ArmorSlot::Boots)
        } else if has("SHIELD") || has("TOTEM") || has("MAP") || has("ARROW") {
            Some(ArmorSlot::Offhand)
        } else {
            None
        }
    }

    /// Items without a natural slot fit anywhere.
    pub fn accepts(self, item: &str) -> bool {
        match ArmorSlot::for_item(item) {
            Some(natural) => natural == self,
            None => true,
        }
    }
}

/// One enchantment that can be applied to an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Enchantment {
    pub id: &'static str,
    pub name: &'static str,
    pub max_level: u8,
}

const fn ench(id: &'static str, name: &'static str, max_level: u8) -> Enchantment {
    Enchantment { id, name, max_level }
}

const ARMOR: &[Enchantment] = &[
    ench("PROTECTION", "Protection", 4),
    ench("FIRE_PROTECTION", "Fire Protection", 4),
    ench("BLAST_PROTECTION", "Blast Protection", 4),
    ench("PROJECTILE_PROTECTION", "Projectile Protection", 4),
    ench("THORNS", "Thorns", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
    ench("CURSE_OF_VANISHING", "Curse of Vanishing", 1),
    ench("CURSE_OF_BINDING", "Curse of Binding", 1),
];

const HELMET: &[Enchantment] = &[
    ench("RESPIRATION", "Respiration", 3),
    ench("AQUA_AFFINITY", "Aqua Affinity", 1),
];

const BOOTS: &[Enchantment] = &[
    ench("FEATHER_FALLING", "Feather Falling", 4),
    ench("DEPTH_STRIDER", "Depth Strider", 3),
    ench("FROST_WALKER", "Frost Walker", 2),
    ench("SOUL_SPEED", "Soul Speed", 3),
    ench("SWIFT_SNEAK", "Swift Sneak", 3),
];

const SWORD: &[Enchantment] = &[
    ench("SHARPNESS", "Sharpness", 5),
    ench("SMITE", "Smite", 5),
    ench("BANE_OF_ARTHROPODS", "Bane of Arthropods", 5),
    ench("KNOCKBACK", "Knockback", 2),
    ench("FIRE_ASPECT", "Fire Aspect", 2),
    ench("LOOTING", "Looting", 3),
    ench("SWEEPING_EDGE", "Sweeping Edge", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const AXE: &[Enchantment] = &[
    ench("SHARPNESS", "Sharpness", 5),
    ench("SMITE", "Smite", 5),
    ench("BANE_OF_ARTHROPODS", "Bane of Arthropods", 5),
    ench("EFFICIENCY", "Efficiency", 5),
    ench("SILK_TOUCH", "Silk Touch", 1),
    ench("FORTUNE", "Fortune", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const BOW: &[Enchantment] = &[
    ench("POWER", "Power", 5),
    ench("PUNCH", "Punch", 2),
    ench("FLAME", "Flame", 1),
    ench("INFINITY", "Infinity", 1),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const CROSSBOW: &[Enchantment] = &[
    ench("MULTISHOT", "Multishot", 1),
    ench("PIERCING", "Piercing", 4),
    ench("QUICK_CHARGE", "Quick Charge", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const TRIDENT: &[Enchantment] = &[
    ench("IMPALING", "Impaling", 5),
    ench("RIPTIDE", "Riptide", 3),
    ench("LOYALTY", "Loyalty", 3),
    ench("CHANNELING", "Channeling", 1),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const TOOL: &[Enchantment] = &[
    ench("EFFICIENCY", "Efficiency", 5),
    ench("SILK_TOUCH", "Silk Touch", 1),
    ench("FORTUNE", "Fortune", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

const FISHING_ROD: &[Enchantment] = &[
    ench("LUCK_OF_THE_SEA", "Luck of the Sea", 3),
    ench("LURE", "Lure", 3),
    ench("UNBREAKING", "Unbreaking", 3),
    ench("MENDING", "Mending", 1),
];

/// Enchantments applicable to `item`. Helmets and boots also get the
/// general armor list.
pub fn enchantments_for(item: &str) -> Vec<Enchantment> {
    let name = item.to_ascii_uppercase();
    let has = |needle: &str| name.contains(needle);

    let tables: &[&[Enchantment]] = if has("HELMET") || has("CAP") {
        &[ARMOR, HELMET]
    } else if has("CHESTPLATE") || has("TUNIC") || has("LEGGINGS") || has("PANTS") {
        &[ARMOR]
    } else if has("BOOTS") {
        &[ARMOR, BOOTS]
    } else if has("SWORD") {
        &[SWORD]
    } else if has("PICKAXE") || has("SHOVEL") || has("HOE") {
        &[TOOL]
    } else if has("AXE") {
        &[AXE]
    } else if has("CROSSBOW") {
        &[CROSSBOW]
    } else if has("BOW") {
        &[BOW]
    } else if has("TRIDENT") {
        &[TRIDENT]
    } else if has("FISHING_ROD") {
        &[FISHING_ROD]
    } else {
        &[]
    };

    tables.iter().flat_map(|t| t.iter().copied()).collect()
}

/// Every palette item, in category order.
pub fn all_items() -> impl Iterator<Item = &'static str> {
    ITEM_CATEGORIES.iter().flat_map(|(_, items)| items.iter().copied())
}

/// Palette items whose id contains `query` (case-insensitive).
pub fn search_items(query: &str) -> Vec<&'static str> {
    let query = query.to_ascii_uppercase();
    all_items().filter(|item| item.contains(&query)).collect()
}
