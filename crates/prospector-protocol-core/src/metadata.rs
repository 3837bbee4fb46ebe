use crate::codec::*;
use crate::particle::{read_particle, write_particle, Particle};
use crate::slot::{read_slot, write_slot, ItemStack};
use crate::{MetadataKind, WireContext};
use bytes::{BufMut, BytesMut};
use prospector_nbt::{read_root, NbtValue};
use prospector_types::{BlockPos, ByteCursor, Identifier};
use std::collections::HashMap;
use uuid::Uuid;

/// Key byte that ends a metadata stream. Never a valid type id.
pub const METADATA_END: u8 = 0xFF;

/// Decoded metadata, keyed by field index.
pub type EntityMetadata = HashMap<u8, MetadataValue>;

/// A chat component, as JSON text before 1.20.3 and NBT after.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatValue {
    Json(String),
    Nbt(NbtValue),
}

/// A dimension and a position within it.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalPos {
    pub dimension: Identifier,
    pub position: BlockPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VillagerData {
    pub kind: i32,
    pub profession: i32,
    pub level: i32,
}

/// One entity metadata value. Optional kinds keep their absent state as `None`
/// inside the variant rather than dropping the entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Byte(u8),
    VarInt(i32),
    VarLong(i64),
    Float(f32),
    String(String),
    Chat(ChatValue),
    OptionalChat(Option<ChatValue>),
    Slot(Option<ItemStack>),
    Boolean(bool),
    Rotation([f32; 3]),
    Position(BlockPos),
    OptionalPosition(Option<BlockPos>),
    Direction(i32),
    OptionalUuid(Option<Uuid>),
    BlockState(i32),
    OptionalBlockState(Option<i32>),
    Nbt(NbtValue),
    Particle(Particle),
    Particles(Vec<Particle>),
    VillagerData(VillagerData),
    OptionalVarInt(Option<i32>),
    Pose(i32),
    CatVariant(i32),
    WolfVariant(i32),
    FrogVariant(i32),
    OptionalGlobalPosition(Option<GlobalPos>),
    PaintingVariant(i32),
    SnifferState(i32),
    ArmadilloState(i32),
    Vector3([f32; 3]),
    Quaternion([f32; 4]),
}

impl MetadataValue {
    pub fn kind(&self) -> MetadataKind {
        match self {
            MetadataValue::Byte(_) => MetadataKind::Byte,
            MetadataValue::VarInt(_) => MetadataKind::VarInt,
            MetadataValue::VarLong(_) => MetadataKind::VarLong,
            MetadataValue::Float(_) => MetadataKind::Float,
            MetadataValue::String(_) => MetadataKind::String,
            MetadataValue::Chat(_) => MetadataKind::Chat,
            MetadataValue::OptionalChat(_) => MetadataKind::OptionalChat,
            MetadataValue::Slot(_) => MetadataKind::Slot,
            MetadataValue::Boolean(_) => MetadataKind::Boolean,
            MetadataValue::Rotation(_) => MetadataKind::Rotation,
            MetadataValue::Position(_) => MetadataKind::Position,
            MetadataValue::OptionalPosition(_) => MetadataKind::OptionalPosition,
            MetadataValue::Direction(_) => MetadataKind::Direction,
            MetadataValue::OptionalUuid(_) => MetadataKind::OptionalUuid,
            MetadataValue::BlockState(_) => MetadataKind::BlockState,
            MetadataValue::OptionalBlockState(_) => MetadataKind::OptionalBlockState,
            MetadataValue::Nbt(_) => MetadataKind::Nbt,
            MetadataValue::Particle(_) => MetadataKind::Particle,
            MetadataValue::Particles(_) => MetadataKind::Particles,
            MetadataValue::VillagerData(_) => MetadataKind::VillagerData,
            MetadataValue::OptionalVarInt(_) => MetadataKind::OptionalVarInt,
            MetadataValue::Pose(_) => MetadataKind::Pose,
            MetadataValue::CatVariant(_) => MetadataKind::CatVariant,
            MetadataValue::WolfVariant(_) => MetadataKind::WolfVariant,
            MetadataValue::FrogVariant(_) => MetadataKind::FrogVariant,
            MetadataValue::OptionalGlobalPosition(_) => MetadataKind::OptionalGlobalPosition,
            MetadataValue::PaintingVariant(_) => MetadataKind::PaintingVariant,
            MetadataValue::SnifferState(_) => MetadataKind::SnifferState,
            MetadataValue::ArmadilloState(_) => MetadataKind::ArmadilloState,
            MetadataValue::Vector3(_) => MetadataKind::Vector3,
            MetadataValue::Quaternion(_) => MetadataKind::Quaternion,
        }
    }
}

/// Read an entity metadata stream up to and including the 0xFF terminator.
/// A later entry for the same index replaces an earlier one.
pub fn read_metadata(cur: &mut ByteCursor<'_>, ctx: &WireContext<'_>) -> CodecResult<EntityMetadata> {
    cur.transaction(|cur| {
        let mut entries = EntityMetadata::new();
        loop {
            let key = read_u8(cur).field("metadata index")?;
            // checked against the raw byte, before any type lookup
            if key == METADATA_END {
                return Ok(entries);
            }
            let type_id = read_varint(cur).field("metadata type")?;
            let kind = ctx.metadata.kind(type_id).ok_or(CodecError::UnknownTypeId {
                kind: "metadata type",
                id: type_id,
            })?;
            let value = read_metadata_value(cur, kind, ctx).field("metadata value")?;
            entries.insert(key, value);
        }
    })
}

/// Read one value of a known kind.
pub fn read_metadata_value(
    cur: &mut ByteCursor<'_>,
    kind: MetadataKind,
    ctx: &WireContext<'_>,
) -> CodecResult<MetadataValue> {
    let layout = ctx.flags.position_layout;
    cur.transaction(|cur| {
        let value = match kind {
            MetadataKind::Byte => MetadataValue::Byte(read_u8(cur)?),
            MetadataKind::VarInt => MetadataValue::VarInt(read_varint(cur)?),
            MetadataKind::VarLong => MetadataValue::VarLong(read_varlong(cur)?),
            MetadataKind::Float => MetadataValue::Float(read_f32(cur)?),
            MetadataKind::String => MetadataValue::String(read_string(cur, MAX_STRING_CHARS)?),
            MetadataKind::Chat => MetadataValue::Chat(read_chat(cur, ctx)?),
            MetadataKind::OptionalChat => {
                MetadataValue::OptionalChat(read_optional(cur, |cur| read_chat(cur, ctx))?)
            }
            MetadataKind::Slot => MetadataValue::Slot(read_slot(cur, ctx)?),
            MetadataKind::Boolean => MetadataValue::Boolean(read_bool(cur)?),
            MetadataKind::Rotation => MetadataValue::Rotation(read_floats(cur)?),
            MetadataKind::Position => MetadataValue::Position(read_position(cur, layout)?),
            MetadataKind::OptionalPosition => MetadataValue::OptionalPosition(read_optional(
                cur,
                |cur| read_position(cur, layout),
            )?),
            MetadataKind::Direction => MetadataValue::Direction(read_varint(cur)?),
            MetadataKind::OptionalUuid => MetadataValue::OptionalUuid(read_optional(cur, read_uuid)?),
            MetadataKind::BlockState => MetadataValue::BlockState(read_varint(cur)?),
            MetadataKind::OptionalBlockState => {
                // 0 is air, which doubles as "absent"
                let state = read_varint(cur)?;
                MetadataValue::OptionalBlockState((state != 0).then_some(state))
            }
            MetadataKind::Nbt => MetadataValue::Nbt(read_root(cur, ctx.flags.nbt_root)?),
            MetadataKind::Particle => MetadataValue::Particle(read_particle(cur, ctx)?),
            MetadataKind::Particles => {
                MetadataValue::Particles(read_list(cur, |cur| read_particle(cur, ctx))?)
            }
            MetadataKind::VillagerData => MetadataValue::VillagerData(VillagerData {
                kind: read_varint(cur)?,
                profession: read_varint(cur)?,
                level: read_varint(cur)?,
            }),
            MetadataKind::OptionalVarInt => MetadataValue::OptionalVarInt(read_optional(cur, read_varint)?),
            MetadataKind::Pose => MetadataValue::Pose(read_varint(cur)?),
            MetadataKind::CatVariant => MetadataValue::CatVariant(read_varint(cur)?),
            MetadataKind::WolfVariant => MetadataValue::WolfVariant(read_varint(cur)?),
            MetadataKind::FrogVariant => MetadataValue::FrogVariant(read_varint(cur)?),
            MetadataKind::OptionalGlobalPosition => {
                MetadataValue::OptionalGlobalPosition(read_optional(cur, |cur| {
                    Ok(GlobalPos {
                        dimension: read_identifier(cur)?,
                        position: read_position(cur, layout)?,
                    })
                })?)
            }
            MetadataKind::PaintingVariant => MetadataValue::PaintingVariant(read_varint(cur)?),
            MetadataKind::SnifferState => MetadataValue::SnifferState(read_varint(cur)?),
            MetadataKind::ArmadilloState => MetadataValue::ArmadilloState(read_varint(cur)?),
            MetadataKind::Vector3 => MetadataValue::Vector3(read_floats(cur)?),
            MetadataKind::Quaternion => MetadataValue::Quaternion(read_floats(cur)?),
        };
        Ok(value)
    })
}

fn read_chat(cur: &mut ByteCursor<'_>, ctx: &WireContext<'_>) -> CodecResult<ChatValue> {
    if ctx.flags.chat_as_nbt {
        Ok(ChatValue::Nbt(read_root(cur, ctx.flags.nbt_root)?))
    } else {
        Ok(ChatValue::Json(read_string(cur, 262144)?))
    }
}

/// A boolean presence flag followed by the value when true.
fn read_optional<'a, T>(
    cur: &mut ByteCursor<'a>,
    value: impl FnOnce(&mut ByteCursor<'a>) -> CodecResult<T>,
) -> CodecResult<Option<T>> {
    if read_bool(cur)? {
        Ok(Some(value(cur)?))
    } else {
        Ok(None)
    }
}

fn read_floats<const N: usize>(cur: &mut ByteCursor<'_>) -> CodecResult<[f32; N]> {
    let mut out = [0f32; N];
    for v in out.iter_mut() {
        *v = read_f32(cur)?;
    }
    Ok(out)
}

/// Write metadata entries in index order, then the terminator.
pub fn write_metadata(buf: &mut BytesMut, metadata: &EntityMetadata, ctx: &WireContext<'_>) -> CodecResult<()> {
    let mut keys: Vec<_> = metadata.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        if key == METADATA_END {
            return Err(CodecError::Unencodable("metadata index 0xFF"));
        }
        let value = &metadata[&key];
        let type_id = ctx
            .metadata
            .id_for(value.kind())
            .ok_or(CodecError::Unencodable("metadata kind missing from this version"))?;
        buf.put_u8(key);
        write_varint(buf, type_id);
        write_metadata_value(buf, value, ctx)?;
    }
    buf.put_u8(METADATA_END);
    Ok(())
}

pub fn write_metadata_value(buf: &mut BytesMut, value: &MetadataValue, ctx: &WireContext<'_>) -> CodecResult<()> {
    let layout = ctx.flags.position_layout;
    match value {
        MetadataValue::Byte(v) => buf.put_u8(*v),
        MetadataValue::VarInt(v)
        | MetadataValue::Direction(v)
        | MetadataValue::BlockState(v)
        | MetadataValue::Pose(v)
        | MetadataValue::CatVariant(v)
        | MetadataValue::WolfVariant(v)
        | MetadataValue::FrogVariant(v)
        | MetadataValue::PaintingVariant(v)
        | MetadataValue::SnifferState(v)
        | MetadataValue::ArmadilloState(v) => write_varint(buf, *v),
        MetadataValue::VarLong(v) => write_varlong(buf, *v),
        MetadataValue::Float(v) => buf.put_f32(*v),
        MetadataValue::String(s) => write_string(buf, s),
        MetadataValue::Chat(chat) => write_chat(buf, chat, ctx)?,
        MetadataValue::OptionalChat(chat) => {
            write_bool(buf, chat.is_some());
            if let Some(chat) = chat {
                write_chat(buf, chat, ctx)?;
            }
        }
        MetadataValue::Slot(slot) => write_slot(buf, slot, ctx)?,
        MetadataValue::Boolean(v) => write_bool(buf, *v),
        MetadataValue::Rotation(v) | MetadataValue::Vector3(v) => {
            for f in v {
                buf.put_f32(*f);
            }
        }
        MetadataValue::Quaternion(v) => {
            for f in v {
                buf.put_f32(*f);
            }
        }
        MetadataValue::Position(pos) => write_position(buf, pos, layout),
        MetadataValue::OptionalPosition(pos) => {
            write_bool(buf, pos.is_some());
            if let Some(pos) = pos {
                write_position(buf, pos, layout);
            }
        }
        MetadataValue::OptionalUuid(uuid) => {
            write_bool(buf, uuid.is_some());
            if let Some(uuid) = uuid {
                write_uuid(buf, uuid);
            }
        }
        MetadataValue::OptionalBlockState(state) => write_varint(buf, state.unwrap_or(0)),
        MetadataValue::Nbt(nbt) => nbt.write_root(ctx.flags.nbt_root, buf)?,
        MetadataValue::Particle(particle) => write_particle(buf, particle, ctx)?,
        MetadataValue::Particles(particles) => {
            write_varint(buf, particles.len() as i32);
            for particle in particles {
                write_particle(buf, particle, ctx)?;
            }
        }
        MetadataValue::VillagerData(data) => {
            write_varint(buf, data.kind);
            write_varint(buf, data.profession);
            write_varint(buf, data.level);
        }
        MetadataValue::OptionalVarInt(v) => {
            write_bool(buf, v.is_some());
            if let Some(v) = v {
                write_varint(buf, *v);
            }
        }
        MetadataValue::OptionalGlobalPosition(pos) => {
            write_bool(buf, pos.is_some());
            if let Some(pos) = pos {
                write_identifier(buf, &pos.dimension);
                write_position(buf, &pos.position, layout);
            }
        }
    }
    Ok(())
}

fn write_chat(buf: &mut BytesMut, chat: &ChatValue, ctx: &WireContext<'_>) -> CodecResult<()> {
    match (chat, ctx.flags.chat_as_nbt) {
        (ChatValue::Json(json), false) => write_string(buf, json),
        (ChatValue::Nbt(nbt), true) => nbt.write_root(ctx.flags.nbt_root, buf)?,
        _ => return Err(CodecError::Unencodable("chat value in the other encoding")),
    }
    Ok(())
}
