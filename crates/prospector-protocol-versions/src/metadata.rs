use crate::flags::*;
use prospector_protocol_core::MetadataKind::{self, *};
use prospector_protocol_core::MetadataTypeTable;

/// 1.14 to 1.18.2.
pub static METADATA_1_14: [MetadataKind; 19] = [
    Byte,
    VarInt,
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
    OptionalBlockState,
    Nbt,
    Particle,
    VillagerData,
    OptionalVarInt,
    Pose,
];

/// 1.19 to 1.19.2.
pub static METADATA_1_19: [MetadataKind; 24] = [
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
    OptionalBlockState,
    Nbt,
    Particle,
    VillagerData,
    OptionalVarInt,
    Pose,
    CatVariant,
    FrogVariant,
    OptionalGlobalPosition,
    PaintingVariant,
];

/// 1.19.3.
pub static METADATA_1_19_3: [MetadataKind; 25] = [
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
    VillagerData,
    OptionalVarInt,
    Pose,
    CatVariant,
    FrogVariant,
    OptionalGlobalPosition,
    PaintingVariant,
];

/// 1.19.4 to 1.20.4.
pub static METADATA_1_19_4: [MetadataKind; 28] = [
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
    VillagerData,
    OptionalVarInt,
    Pose,
    CatVariant,
    FrogVariant,
    OptionalGlobalPosition,
    PaintingVariant,
    SnifferState,
    Vector3,
    Quaternion,
];

/// 1.20.5 to 1.21.
pub static METADATA_1_20_5: [MetadataKind; 31] = [
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
];

/// The metadata type table for a protocol version, or `None` before 1.14.
pub fn metadata_table(protocol: i32) -> Option<&'static dyn MetadataTypeTable> {
    let table: &'static dyn MetadataTypeTable = match protocol {
        p if p < V1_14 => return None,
        p if p < V1_19 => &METADATA_1_14,
        p if p <= V1_19_2 => &METADATA_1_19,
        V1_19_3 => &METADATA_1_19_3,
        p if p < V1_20_5 => &METADATA_1_19_4,
        _ => &METADATA_1_20_5,
    };
    Some(table)
}
