pub mod adapter;
pub mod codec;
pub mod connection;
pub mod entity;
pub mod metadata;
pub mod packets;
pub mod particle;
pub mod slot;
pub mod state;

pub use adapter::*;
pub use codec::*;
pub use connection::{encode_frame, Connection, ConnectionError, Frame, FrameAccumulator, FrameError, MAX_PACKET_LEN};
pub use entity::*;
pub use metadata::*;
pub use packets::*;
pub use particle::*;
pub use slot::*;
pub use state::*;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::*;
    use prospector_nbt::RootMode;
    use prospector_types::PositionLayout;
    use std::collections::HashMap;

    pub const COMPONENT_DAMAGE: i32 = 3;
    pub const COMPONENT_CUSTOM_NAME: i32 = 5;
    pub const COMPONENT_ENCHANTMENTS: i32 = 9;
    pub const COMPONENT_HIDE_TOOLTIP: i32 = 15;
    pub const COMPONENT_GLINT: i32 = 18;
    pub const COMPONENT_BUNDLE: i32 = 30;

    pub const PARTICLE_BLOCK: i32 = 1;
    pub const PARTICLE_DUST: i32 = 13;
    pub const PARTICLE_FLAME: i32 = 31;
    pub const PARTICLE_ITEM: i32 = 44;

    static MODERN_METADATA: [MetadataKind; 31] = [
        MetadataKind::Byte,
        MetadataKind::VarInt,
        MetadataKind::VarLong,
        MetadataKind::Float,
        MetadataKind::String,
        MetadataKind::Chat,
        MetadataKind::OptionalChat,
        MetadataKind::Slot,
        MetadataKind::Boolean,
        MetadataKind::Rotation,
        MetadataKind::Position,
        MetadataKind::OptionalPosition,
        MetadataKind::Direction,
        MetadataKind::OptionalUuid,
        MetadataKind::BlockState,
        MetadataKind::OptionalBlockState,
        MetadataKind::Nbt,
        MetadataKind::Particle,
        MetadataKind::Particles,
        MetadataKind::VillagerData,
        MetadataKind::OptionalVarInt,
        MetadataKind::Pose,
        MetadataKind::CatVariant,
        MetadataKind::WolfVariant,
        MetadataKind::FrogVariant,
        MetadataKind::OptionalGlobalPosition,
        MetadataKind::PaintingVariant,
        MetadataKind::SnifferState,
        MetadataKind::ArmadilloState,
        MetadataKind::Vector3,
        MetadataKind::Quaternion,
    ];

    static LEGACY_METADATA: [MetadataKind; 28] = [
        MetadataKind::Byte,
        MetadataKind::VarInt,
        MetadataKind::VarLong,
        MetadataKind::Float,
        MetadataKind::String,
        MetadataKind::Chat,
        MetadataKind::OptionalChat,
        MetadataKind::Slot,
        MetadataKind::Boolean,
        MetadataKind::Rotation,
        MetadataKind::Position,
        MetadataKind::OptionalPosition,
        MetadataKind::Direction,
        MetadataKind::OptionalUuid,
        MetadataKind::BlockState,
        MetadataKind::OptionalBlockState,
        MetadataKind::Nbt,
        MetadataKind::Particle,
        MetadataKind::VillagerData,
        MetadataKind::OptionalVarInt,
        MetadataKind::Pose,
        MetadataKind::CatVariant,
        MetadataKind::FrogVariant,
        MetadataKind::OptionalGlobalPosition,
        MetadataKind::PaintingVariant,
        MetadataKind::SnifferState,
        MetadataKind::Vector3,
        MetadataKind::Quaternion,
    ];

    /// A small slice of the 1.20.5 registries plus a 1.19.4 metadata table.
    pub struct Tables {
        components: HashMap<i32, ComponentShape>,
        particles: HashMap<i32, ParticleShape>,
    }

    impl Tables {
        pub fn new() -> Self {
            let components = HashMap::from([
                (0, ComponentShape::Nbt),
                (COMPONENT_DAMAGE, ComponentShape::VarInt),
                (4, ComponentShape::Bool),
                (COMPONENT_CUSTOM_NAME, ComponentShape::Text),
                (7, ComponentShape::TextList),
                (COMPONENT_ENCHANTMENTS, ComponentShape::Enchantments),
                (COMPONENT_HIDE_TOOLTIP, ComponentShape::Empty),
                (COMPONENT_GLINT, ComponentShape::Bool),
                (24, ComponentShape::DyedColor),
                (25, ComponentShape::Int),
                (COMPONENT_BUNDLE, ComponentShape::ItemList),
                (40, ComponentShape::Identifier),
            ]);
            let particles = HashMap::from([
                (0, ParticleShape::None),
                (PARTICLE_BLOCK, ParticleShape::Block),
                (PARTICLE_DUST, ParticleShape::Dust),
                (14, ParticleShape::DustColorTransition),
                (20, ParticleShape::EntityEffect),
                (PARTICLE_FLAME, ParticleShape::None),
                (PARTICLE_ITEM, ParticleShape::Item),
                (45, ParticleShape::Vibration),
                (35, ParticleShape::SculkCharge),
                (99, ParticleShape::Shriek),
            ]);
            Self {
                components,
                particles,
            }
        }

        /// 1.20.5 and later.
        pub fn modern(&self) -> WireContext<'_> {
            WireContext {
                flags: WireFlags {
                    nbt_root: RootMode::Anonymous,
                    slot_layout: SlotLayout::Structured,
                    position_layout: PositionLayout::Modern,
                    chat_as_nbt: true,
                    modern_entity_spawn: true,
                    particle: ParticleFlags {
                        packed_color: false,
                        has_origin: false,
                        has_eye_height: true,
                        vibration_source_by_id: true,
                    },
                },
                metadata: &MODERN_METADATA,
                components: &self.components,
                particles: &self.particles,
            }
        }

        /// 1.19.4: named NBT roots, legacy slots, JSON chat.
        pub fn legacy(&self) -> WireContext<'_> {
            WireContext {
                flags: WireFlags {
                    nbt_root: RootMode::Named,
                    slot_layout: SlotLayout::Legacy,
                    position_layout: PositionLayout::Modern,
                    chat_as_nbt: false,
                    modern_entity_spawn: true,
                    particle: ParticleFlags {
                        packed_color: false,
                        has_origin: false,
                        has_eye_height: true,
                        vibration_source_by_id: false,
                    },
                },
                metadata: &LEGACY_METADATA,
                components: &NoComponents,
                particles: &self.particles,
            }
        }
    }
}
