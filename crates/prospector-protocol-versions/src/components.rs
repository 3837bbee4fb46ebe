use prospector_protocol_core::ComponentRegistry;
use prospector_protocol_core::ComponentShape::{self, *};

/// Structured item components, sorted by id.
#[derive(Debug, Clone, Copy)]
pub struct ComponentTable {
    entries: &'static [(i32, &'static str, ComponentShape)],
}

impl ComponentTable {
    pub const EMPTY: ComponentTable = ComponentTable { entries: &[] };

    pub fn name(&self, component_id: i32) -> Option<&'static str> {
        self.entry(component_id).map(|(_, name, _)| *name)
    }

    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(id, _, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, component_id: i32) -> Option<&'static (i32, &'static str, ComponentShape)> {
        let entries = self.entries;
        entries
            .binary_search_by_key(&component_id, |(id, _, _)| *id)
            .ok()
            .map(|i| &entries[i])
    }
}

impl ComponentRegistry for ComponentTable {
    fn shape(&self, component_id: i32) -> Option<ComponentShape> {
        self.entry(component_id).map(|(_, _, shape)| *shape)
    }
}

/// Components whose payload this client can read, 1.20.5 to 1.21.
/// Ids missing here carry payloads (food, tools, attribute modifiers and the like)
/// that decode to an unknown component error.
pub static COMPONENTS_1_20_5: ComponentTable = ComponentTable {
    entries: &[
        (0, "minecraft:custom_data", Nbt),
        (1, "minecraft:max_stack_size", VarInt),
        (2, "minecraft:max_damage", VarInt),
        (3, "minecraft:damage", VarInt),
        (4, "minecraft:unbreakable", Bool),
        (5, "minecraft:custom_name", Text),
        (6, "minecraft:item_name", Text),
        (7, "minecraft:lore", TextList),
        (8, "minecraft:rarity", VarInt),
        (9, "minecraft:enchantments", Enchantments),
        (13, "minecraft:custom_model_data", VarInt),
        (14, "minecraft:hide_additional_tooltip", Empty),
        (15, "minecraft:hide_tooltip", Empty),
        (16, "minecraft:repair_cost", VarInt),
        (17, "minecraft:creative_slot_lock", Empty),
        (18, "minecraft:enchantment_glint_override", Bool),
        (19, "minecraft:intangible_projectile", Nbt),
        (21, "minecraft:fire_resistant", Empty),
        (23, "minecraft:stored_enchantments", Enchantments),
        (24, "minecraft:dyed_color", DyedColor),
        (25, "minecraft:map_color", Int),
        (26, "minecraft:map_id", VarInt),
        (27, "minecraft:map_decorations", Nbt),
        (28, "minecraft:map_post_processing", VarInt),
        (29, "minecraft:charged_projectiles", ItemList),
        (30, "minecraft:bundle_contents", ItemList),
        (36, "minecraft:debug_stick_state", Nbt),
        (37, "minecraft:entity_data", Nbt),
        (38, "minecraft:bucket_entity_data", Nbt),
        (39, "minecraft:block_entity_data", Nbt),
        (41, "minecraft:ominous_bottle_amplifier", VarInt),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_id() {
        let ids: Vec<i32> = COMPONENTS_1_20_5.entries.iter().map(|(id, _, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(COMPONENTS_1_20_5.shape(3), Some(VarInt));
        assert_eq!(COMPONENTS_1_20_5.shape(30), Some(ItemList));
        assert_eq!(COMPONENTS_1_20_5.shape(20), None);
        assert_eq!(COMPONENTS_1_20_5.name(9), Some("minecraft:enchantments"));
        assert_eq!(COMPONENTS_1_20_5.id_of("minecraft:dyed_color"), Some(24));
        assert!(ComponentTable::EMPTY.is_empty());
        assert_eq!(ComponentTable::EMPTY.shape(0), None);
    }
}
