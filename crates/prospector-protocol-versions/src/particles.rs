use prospector_protocol_core::{ParticlePalette, ParticleShape};

/// Particle types indexed by id. Extra-data shapes follow from the name.
#[derive(Debug, Clone, Copy)]
pub struct ParticleTable {
    names: &'static [&'static str],
}

impl ParticleTable {
    pub const EMPTY: ParticleTable = ParticleTable { names: &[] };

    pub fn name(&self, particle_id: i32) -> Option<&'static str> {
        usize::try_from(particle_id)
            .ok()
            .and_then(|i| self.names.get(i))
            .copied()
    }

    pub fn id_of(&self, name: &str) -> Option<i32> {
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        self.names.iter().position(|n| *n == name).map(|i| i as i32)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ParticlePalette for ParticleTable {
    fn shape(&self, particle_id: i32) -> Option<ParticleShape> {
        self.name(particle_id).map(shape_for_name)
    }
}

/// The extra data a particle type carries.
pub fn shape_for_name(name: &str) -> ParticleShape {
    match name {
        "block" | "block_marker" | "falling_dust" | "dust_pillar" => ParticleShape::Block,
        "dust" => ParticleShape::Dust,
        "dust_color_transition" => ParticleShape::DustColorTransition,
        "entity_effect" => ParticleShape::EntityEffect,
        "sculk_charge" => ParticleShape::SculkCharge,
        "item" => ParticleShape::Item,
        "vibration" => ParticleShape::Vibration,
        "shriek" => ParticleShape::Shriek,
        _ => ParticleShape::None,
    }
}

/// 1.20.5 to 1.21.
pub static PARTICLES_1_20_5: ParticleTable = ParticleTable {
    names: &[
        "angry_villager", "block", "block_marker", "bubble", "cloud", "crit", "damage_indicator",
        "dragon_breath", "dripping_lava", "falling_lava", "landing_lava", "dripping_water",
        "falling_water", "dust", "dust_color_transition", "effect", "elder_guardian",
        "enchanted_hit", "enchant", "end_rod", "entity_effect", "explosion_emitter", "explosion",
        "gust", "small_gust", "gust_emitter_large", "gust_emitter_small", "sonic_boom",
        "falling_dust", "firework", "fishing", "flame", "infested", "cherry_leaves", "sculk_soul",
        "sculk_charge", "sculk_charge_pop", "soul_fire_flame", "soul", "flash", "happy_villager",
        "composter", "heart", "instant_effect", "item", "vibration", "item_slime", "item_cobweb",
        "item_snowball", "large_smoke", "lava", "mycelium", "note", "poof", "portal", "rain",
        "smoke", "white_smoke", "sneeze", "spit", "squid_ink", "sweep_attack", "totem_of_undying",
        "underwater", "splash", "witch", "bubble_pop", "current_down", "bubble_column_up",
        "nautilus", "dolphin", "campfire_cosy_smoke", "campfire_signal_smoke", "dripping_honey",
        "falling_honey", "landing_honey", "falling_nectar", "falling_spore_blossom", "ash",
        "crimson_spore", "warped_spore", "spore_blossom_air", "dripping_obsidian_tear",
        "falling_obsidian_tear", "landing_obsidian_tear", "reverse_portal", "white_ash",
        "small_flame", "snowflake", "dripping_dripstone_lava", "falling_dripstone_lava",
        "dripping_dripstone_water", "falling_dripstone_water", "glow_squid_ink", "glow", "wax_on",
        "wax_off", "electric_spark", "scrape", "shriek", "egg_crack", "dust_plume",
        "trial_spawner_detected_player", "trial_spawner_detected_player_ominous",
        "vault_connection", "dust_pillar", "ominous_spawning", "raid_omen", "trial_omen",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(PARTICLES_1_20_5.len(), 109);
        assert_eq!(PARTICLES_1_20_5.name(0), Some("angry_villager"));
        assert_eq!(PARTICLES_1_20_5.name(108), Some("trial_omen"));
        assert_eq!(PARTICLES_1_20_5.id_of("minecraft:flame"), Some(31));
        assert_eq!(PARTICLES_1_20_5.id_of("item"), Some(44));
    }

    #[test]
    fn test_shapes() {
        assert_eq!(PARTICLES_1_20_5.shape(1), Some(ParticleShape::Block));
        assert_eq!(PARTICLES_1_20_5.shape(13), Some(ParticleShape::Dust));
        assert_eq!(PARTICLES_1_20_5.shape(45), Some(ParticleShape::Vibration));
        assert_eq!(PARTICLES_1_20_5.shape(99), Some(ParticleShape::Shriek));
        assert_eq!(PARTICLES_1_20_5.shape(105), Some(ParticleShape::Block));
        assert_eq!(PARTICLES_1_20_5.shape(31), Some(ParticleShape::None));
        assert_eq!(PARTICLES_1_20_5.shape(109), None);
        assert_eq!(PARTICLES_1_20_5.shape(-1), None);
    }
}
