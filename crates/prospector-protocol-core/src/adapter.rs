use prospector_nbt::RootMode;
use prospector_types::PositionLayout;
use std::collections::HashMap;

/// Value kinds an entity metadata entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    Byte,
    VarInt,
    VarLong,
    Float,
    String,
    Chat,
    OptionalChat,
    Slot,
    Boolean,
    Rotation,
    Position,
    OptionalPosition,
    Direction,
    OptionalUuid,
    BlockState,
    OptionalBlockState,
    Nbt,
    Particle,
    Particles,
    VillagerData,
    OptionalVarInt,
    Pose,
    CatVariant,
    WolfVariant,
    FrogVariant,
    OptionalGlobalPosition,
    PaintingVariant,
    SnifferState,
    ArmadilloState,
    Vector3,
    Quaternion,
}

/// Payload shape of a structured item component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentShape {
    /// No payload; presence is the value.
    Empty,
    VarInt,
    Int,
    Bool,
    Nbt,
    Text,
    TextList,
    /// VarInt count of (enchantment id, level) pairs and a tooltip flag.
    Enchantments,
    /// RGB int and a tooltip flag.
    DyedColor,
    Identifier,
    /// VarInt count of nested item slots.
    ItemList,
}

/// Extra data carried after a particle type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    None,
    Block,
    Dust,
    DustColorTransition,
    EntityEffect,
    SculkCharge,
    Item,
    Vibration,
    Shriek,
}

/// Maps a metadata type id to its value kind for one protocol version.
pub trait MetadataTypeTable: Send + Sync {
    fn kind(&self, type_id: i32) -> Option<MetadataKind>;

    /// Reverse lookup, used when encoding.
    fn id_for(&self, kind: MetadataKind) -> Option<i32>;
}

/// Maps a structured component id to its payload shape for one protocol version.
pub trait ComponentRegistry: Send + Sync {
    fn shape(&self, component_id: i32) -> Option<ComponentShape>;
}

/// Maps a particle type id to the shape of its extra data for one protocol version.
pub trait ParticlePalette: Send + Sync {
    fn shape(&self, particle_id: i32) -> Option<ParticleShape>;
}

// A slice is indexed by type id.
impl MetadataTypeTable for [MetadataKind] {
    fn kind(&self, type_id: i32) -> Option<MetadataKind> {
        usize::try_from(type_id).ok().and_then(|i| self.get(i)).copied()
    }

    fn id_for(&self, kind: MetadataKind) -> Option<i32> {
        self.iter().position(|k| *k == kind).map(|i| i as i32)
    }
}

impl<const N: usize> MetadataTypeTable for [MetadataKind; N] {
    fn kind(&self, type_id: i32) -> Option<MetadataKind> {
        self.as_slice().kind(type_id)
    }

    fn id_for(&self, kind: MetadataKind) -> Option<i32> {
        self.as_slice().id_for(kind)
    }
}

impl MetadataTypeTable for Vec<MetadataKind> {
    fn kind(&self, type_id: i32) -> Option<MetadataKind> {
        self.as_slice().kind(type_id)
    }

    fn id_for(&self, kind: MetadataKind) -> Option<i32> {
        self.as_slice().id_for(kind)
    }
}

impl ParticlePalette for [ParticleShape] {
    fn shape(&self, particle_id: i32) -> Option<ParticleShape> {
        usize::try_from(particle_id).ok().and_then(|i| self.get(i)).copied()
    }
}

impl<const N: usize> ParticlePalette for [ParticleShape; N] {
    fn shape(&self, particle_id: i32) -> Option<ParticleShape> {
        self.as_slice().shape(particle_id)
    }
}

impl ComponentRegistry for HashMap<i32, ComponentShape> {
    fn shape(&self, component_id: i32) -> Option<ComponentShape> {
        self.get(&component_id).copied()
    }
}

impl ParticlePalette for HashMap<i32, ParticleShape> {
    fn shape(&self, particle_id: i32) -> Option<ParticleShape> {
        self.get(&particle_id).copied()
    }
}

/// A registry with no components, for versions that predate them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoComponents;

impl ComponentRegistry for NoComponents {
    fn shape(&self, _component_id: i32) -> Option<ComponentShape> {
        None
    }
}

/// Item slot wire layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLayout {
    /// Presence bool, VarInt item id, byte count, NBT (1.13.2 to 1.20.4).
    Legacy,
    /// VarInt count, item id, added and removed component lists (1.20.5+).
    Structured,
}

/// Particle byte-layout switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParticleFlags {
    /// Dust colours are packed RGB ints instead of three floats (1.21.2+).
    pub packed_color: bool,
    /// Vibration starts with an origin position (1.17 to 1.18.2).
    pub has_origin: bool,
    /// Entity vibration sources carry an eye height (1.19+).
    pub has_eye_height: bool,
    /// Vibration source type is a VarInt id rather than an identifier (1.20.5+).
    pub vibration_source_by_id: bool,
}

/// Every version-dependent layout switch the decoders accept,
/// resolved once from the active protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFlags {
    pub nbt_root: RootMode,
    pub slot_layout: SlotLayout,
    pub position_layout: PositionLayout,
    /// Chat values are NBT text components instead of JSON strings (1.20.3+).
    pub chat_as_nbt: bool,
    /// Spawn records carry head yaw and a VarInt data field (1.19+).
    pub modern_entity_spawn: bool,
    pub particle: ParticleFlags,
}

/// Flags plus the injected tables the composite decoders consult.
#[derive(Clone, Copy)]
pub struct WireContext<'a> {
    pub flags: WireFlags,
    pub metadata: &'a dyn MetadataTypeTable,
    pub components: &'a dyn ComponentRegistry,
    pub particles: &'a dyn ParticlePalette,
}

impl std::fmt::Debug for WireContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireContext")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_table_lookup() {
        let table = [MetadataKind::Byte, MetadataKind::VarInt];
        assert_eq!(table.kind(1), Some(MetadataKind::VarInt));
        assert_eq!(table.kind(2), None);
        assert_eq!(table.kind(-1), None);
        assert_eq!(table.id_for(MetadataKind::Byte), Some(0));
        assert_eq!(table.id_for(MetadataKind::Quaternion), None);

        let dynamic: &dyn MetadataTypeTable = &table;
        assert_eq!(dynamic.kind(0), Some(MetadataKind::Byte));
    }

    #[test]
    fn test_map_registry_lookup() {
        let mut registry: HashMap<i32, ComponentShape> = HashMap::new();
        registry.insert(3, ComponentShape::VarInt);
        assert_eq!(registry.shape(3), Some(ComponentShape::VarInt));
        assert_eq!(registry.shape(4), None);
        assert_eq!(NoComponents.shape(0), None);
    }
}
