use crate::codec::*;
use crate::slot::{read_slot, write_slot, ItemStack};
use crate::{ParticleFlags, ParticleShape, WireContext};
use bytes::{BufMut, BytesMut};
use prospector_types::{BlockPos, ByteCursor, Identifier, PositionLayout};

const VIBRATION_SOURCE_BLOCK: i32 = 0;
const VIBRATION_SOURCE_ENTITY: i32 = 1;

/// A particle type id and its extra data.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub particle_id: i32,
    pub data: ParticleData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticleData {
    None,
    Block(i32),
    Dust {
        color: ParticleColor,
        scale: f32,
    },
    DustColorTransition {
        from: ParticleColor,
        to: ParticleColor,
        scale: f32,
    },
    /// ARGB colour.
    EntityEffect(i32),
    SculkCharge {
        roll: f32,
    },
    Item(Option<ItemStack>),
    Vibration(Vibration),
    Shriek {
        delay: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleColor {
    Floats([f32; 3]),
    Packed(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vibration {
    pub origin: Option<BlockPos>,
    pub source: VibrationSource,
    pub ticks: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VibrationSource {
    Block(BlockPos),
    Entity { entity_id: i32, eye_height: Option<f32> },
}

impl ParticleData {
    pub fn shape(&self) -> ParticleShape {
        match self {
            ParticleData::None => ParticleShape::None,
            ParticleData::Block(_) => ParticleShape::Block,
            ParticleData::Dust { .. } => ParticleShape::Dust,
            ParticleData::DustColorTransition { .. } => ParticleShape::DustColorTransition,
            ParticleData::EntityEffect(_) => ParticleShape::EntityEffect,
            ParticleData::SculkCharge { .. } => ParticleShape::SculkCharge,
            ParticleData::Item(_) => ParticleShape::Item,
            ParticleData::Vibration(_) => ParticleShape::Vibration,
            ParticleData::Shriek { .. } => ParticleShape::Shriek,
        }
    }
}

/// Read a VarInt particle type id followed by its extra data.
pub fn read_particle(cur: &mut ByteCursor<'_>, ctx: &WireContext<'_>) -> CodecResult<Particle> {
    cur.transaction(|cur| {
        let particle_id = read_varint(cur).field("particle id")?;
        let shape = ctx.particles.shape(particle_id).ok_or(CodecError::UnknownTypeId {
            kind: "particle",
            id: particle_id,
        })?;
        let data = read_particle_data(cur, shape, ctx).field("particle data")?;
        Ok(Particle { particle_id, data })
    })
}

/// Read the extra data for a particle whose shape is already known.
pub fn read_particle_data(
    cur: &mut ByteCursor<'_>,
    shape: ParticleShape,
    ctx: &WireContext<'_>,
) -> CodecResult<ParticleData> {
    let flags = ctx.flags.particle;
    cur.transaction(|cur| {
        let data = match shape {
            ParticleShape::None => ParticleData::None,
            ParticleShape::Block => ParticleData::Block(read_varint(cur)?),
            ParticleShape::Dust => {
                let color = read_color(cur, flags)?;
                ParticleData::Dust {
                    color,
                    scale: read_f32(cur)?,
                }
            }
            ParticleShape::DustColorTransition => {
                if flags.packed_color {
                    let from = read_color(cur, flags)?;
                    let to = read_color(cur, flags)?;
                    let scale = read_f32(cur)?;
                    ParticleData::DustColorTransition { from, to, scale }
                } else {
                    let from = read_color(cur, flags)?;
                    let scale = read_f32(cur)?;
                    let to = read_color(cur, flags)?;
                    ParticleData::DustColorTransition { from, to, scale }
                }
            }
            ParticleShape::EntityEffect => ParticleData::EntityEffect(read_i32(cur)?),
            ParticleShape::SculkCharge => ParticleData::SculkCharge {
                roll: read_f32(cur)?,
            },
            ParticleShape::Item => ParticleData::Item(read_slot(cur, ctx)?),
            ParticleShape::Vibration => {
                ParticleData::Vibration(read_vibration(cur, flags, ctx.flags.position_layout)?)
            }
            ParticleShape::Shriek => ParticleData::Shriek {
                delay: read_varint(cur)?,
            },
        };
        Ok(data)
    })
}

fn read_color(cur: &mut ByteCursor<'_>, flags: ParticleFlags) -> CodecResult<ParticleColor> {
    if flags.packed_color {
        Ok(ParticleColor::Packed(read_i32(cur)?))
    } else {
        Ok(ParticleColor::Floats([read_f32(cur)?, read_f32(cur)?, read_f32(cur)?]))
    }
}

fn read_vibration(
    cur: &mut ByteCursor<'_>,
    flags: ParticleFlags,
    layout: PositionLayout,
) -> CodecResult<Vibration> {
    let origin = if flags.has_origin {
        Some(read_position(cur, layout).field("vibration origin")?)
    } else {
        None
    };
    let source_type = if flags.vibration_source_by_id {
        read_varint(cur).field("vibration source type")?
    } else {
        let id = read_identifier(cur).field("vibration source type")?;
        match (id.namespace.as_str(), id.path.as_str()) {
            ("minecraft", "block") => VIBRATION_SOURCE_BLOCK,
            ("minecraft", "entity") => VIBRATION_SOURCE_ENTITY,
            _ => {
                return Err(CodecError::UnknownIdentifier {
                    kind: "vibration source",
                    id: id.to_string(),
                })
            }
        }
    };
    let source = match source_type {
        VIBRATION_SOURCE_BLOCK => VibrationSource::Block(read_position(cur, layout)?),
        VIBRATION_SOURCE_ENTITY => {
            let entity_id = read_varint(cur)?;
            let eye_height = if flags.has_eye_height {
                Some(read_f32(cur)?)
            } else {
                None
            };
            VibrationSource::Entity {
                entity_id,
                eye_height,
            }
        }
        other => {
            return Err(CodecError::UnknownTypeId {
                kind: "vibration source",
                id: other,
            })
        }
    };
    let ticks = read_varint(cur).field("vibration ticks")?;
    Ok(Vibration {
        origin,
        source,
        ticks,
    })
}

pub fn write_particle(buf: &mut BytesMut, particle: &Particle, ctx: &WireContext<'_>) -> CodecResult<()> {
    write_varint(buf, particle.particle_id);
    write_particle_data(buf, &particle.data, ctx)
}

pub fn write_particle_data(buf: &mut BytesMut, data: &ParticleData, ctx: &WireContext<'_>) -> CodecResult<()> {
    let flags = ctx.flags.particle;
    match data {
        ParticleData::None => {}
        ParticleData::Block(state) => write_varint(buf, *state),
        ParticleData::Dust { color, scale } => {
            write_color(buf, color, flags)?;
            buf.put_f32(*scale);
        }
        ParticleData::DustColorTransition { from, to, scale } => {
            write_color(buf, from, flags)?;
            if flags.packed_color {
                write_color(buf, to, flags)?;
                buf.put_f32(*scale);
            } else {
                buf.put_f32(*scale);
                write_color(buf, to, flags)?;
            }
        }
        ParticleData::EntityEffect(argb) => buf.put_i32(*argb),
        ParticleData::SculkCharge { roll } => buf.put_f32(*roll),
        ParticleData::Item(item) => write_slot(buf, item, ctx)?,
        ParticleData::Vibration(vibration) => {
            write_vibration(buf, vibration, flags, ctx.flags.position_layout)?
        }
        ParticleData::Shriek { delay } => write_varint(buf, *delay),
    }
    Ok(())
}

fn write_color(buf: &mut BytesMut, color: &ParticleColor, flags: ParticleFlags) -> CodecResult<()> {
    match (color, flags.packed_color) {
        (ParticleColor::Packed(rgb), true) => buf.put_i32(*rgb),
        (ParticleColor::Floats([r, g, b]), false) => {
            buf.put_f32(*r);
            buf.put_f32(*g);
            buf.put_f32(*b);
        }
        _ => return Err(CodecError::Unencodable("particle colour in the other layout")),
    }
    Ok(())
}

fn write_vibration(
    buf: &mut BytesMut,
    vibration: &Vibration,
    flags: ParticleFlags,
    layout: PositionLayout,
) -> CodecResult<()> {
    match (&vibration.origin, flags.has_origin) {
        (Some(origin), true) => write_position(buf, origin, layout),
        (None, false) => {}
        _ => return Err(CodecError::Unencodable("vibration origin in the other layout")),
    }
    let source_type = match vibration.source {
        VibrationSource::Block(_) => VIBRATION_SOURCE_BLOCK,
        VibrationSource::Entity { .. } => VIBRATION_SOURCE_ENTITY,
    };
    if flags.vibration_source_by_id {
        write_varint(buf, source_type);
    } else {
        let path = if source_type == VIBRATION_SOURCE_BLOCK { "block" } else { "entity" };
        write_identifier(buf, &Identifier::minecraft(path));
    }
    match &vibration.source {
        VibrationSource::Block(pos) => write_position(buf, pos, layout),
        VibrationSource::Entity {
            entity_id,
            eye_height,
        } => {
            write_varint(buf, *entity_id);
            match (eye_height, flags.has_eye_height) {
                (Some(height), true) => buf.put_f32(*height),
                (None, false) => {}
                _ => return Err(CodecError::Unencodable("eye height in the other layout")),
            }
        }
    }
    write_varint(buf, vibration.ticks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_plain_particle() {
        let tables = Tables::new();
        let data = [PARTICLE_FLAME as u8, 0x55];
        let mut cur = ByteCursor::new(&data);
        let particle = read_particle(&mut cur, &tables.modern()).unwrap();
        assert_eq!(
            particle,
            Particle {
                particle_id: PARTICLE_FLAME,
                data: ParticleData::None
            }
        );
        assert_eq!(cur.rest(), &[0x55]);
    }

    #[test]
    fn test_unknown_particle() {
        let tables = Tables::new();
        let data = [0x7E];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_particle(&mut cur, &tables.modern()),
            Err(CodecError::UnknownTypeId { kind: "particle", id: 0x7E })
        ));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_dust_float_layout() {
        let tables = Tables::new();
        let mut buf = BytesMut::new();
        write_varint(&mut buf, PARTICLE_DUST);
        for v in [1.0f32, 0.5, 0.25, 2.0] {
            buf.put_f32(v);
        }
        let mut cur = ByteCursor::new(&buf);
        let particle = read_particle(&mut cur, &tables.modern()).unwrap();
        assert_eq!(
            particle.data,
            ParticleData::Dust {
                color: ParticleColor::Floats([1.0, 0.5, 0.25]),
                scale: 2.0
            }
        );
    }

    #[test]
    fn test_dust_packed_layout() {
        let tables = Tables::new();
        let mut ctx = tables.modern();
        ctx.flags.particle.packed_color = true;
        let mut buf = BytesMut::new();
        write_varint(&mut buf, PARTICLE_DUST);
        buf.put_i32(0xFF0000);
        buf.put_f32(1.5);
        let mut cur = ByteCursor::new(&buf);
        let particle = read_particle(&mut cur, &ctx).unwrap();
        assert_eq!(
            particle.data,
            ParticleData::Dust {
                color: ParticleColor::Packed(0xFF0000),
                scale: 1.5
            }
        );
        assert!(cur.is_empty());
    }

    #[test]
    fn test_color_transition_orders() {
        let tables = Tables::new();
        let float_data = ParticleData::DustColorTransition {
            from: ParticleColor::Floats([0.1, 0.2, 0.3]),
            to: ParticleColor::Floats([0.4, 0.5, 0.6]),
            scale: 1.0,
        };
        let ctx = tables.modern();
        let mut buf = BytesMut::new();
        write_particle_data(&mut buf, &float_data, &ctx).unwrap();
        // from (12 bytes), scale, to
        assert_eq!(&buf[12..16], &1.0f32.to_be_bytes());
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(
            read_particle_data(&mut cur, ParticleShape::DustColorTransition, &ctx).unwrap(),
            float_data
        );

        let mut packed_ctx = tables.modern();
        packed_ctx.flags.particle.packed_color = true;
        let packed_data = ParticleData::DustColorTransition {
            from: ParticleColor::Packed(1),
            to: ParticleColor::Packed(2),
            scale: 0.5,
        };
        let mut buf = BytesMut::new();
        write_particle_data(&mut buf, &packed_data, &packed_ctx).unwrap();
        assert_eq!(&buf[8..12], &0.5f32.to_be_bytes());
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(
            read_particle_data(&mut cur, ParticleShape::DustColorTransition, &packed_ctx).unwrap(),
            packed_data
        );
    }

    #[test]
    fn test_vibration_by_identifier() {
        let tables = Tables::new();
        let mut ctx = tables.modern();
        ctx.flags.particle.vibration_source_by_id = false;
        let mut buf = BytesMut::new();
        write_string(&mut buf, "minecraft:entity");
        write_varint(&mut buf, 42);
        buf.put_f32(1.62);
        write_varint(&mut buf, 20);
        let mut cur = ByteCursor::new(&buf);
        let data = read_particle_data(&mut cur, ParticleShape::Vibration, &ctx).unwrap();
        assert_eq!(
            data,
            ParticleData::Vibration(Vibration {
                origin: None,
                source: VibrationSource::Entity {
                    entity_id: 42,
                    eye_height: Some(1.62)
                },
                ticks: 20
            })
        );
    }

    #[test]
    fn test_vibration_legacy_origin() {
        let tables = Tables::new();
        let mut ctx = tables.legacy();
        ctx.flags.particle = ParticleFlags {
            packed_color: false,
            has_origin: true,
            has_eye_height: false,
            vibration_source_by_id: false,
        };
        let vibration = ParticleData::Vibration(Vibration {
            origin: Some(BlockPos::new(1, 2, 3)),
            source: VibrationSource::Block(BlockPos::new(-4, 5, -6)),
            ticks: 7,
        });
        let mut buf = BytesMut::new();
        write_particle_data(&mut buf, &vibration, &ctx).unwrap();
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(
            read_particle_data(&mut cur, ParticleShape::Vibration, &ctx).unwrap(),
            vibration
        );
        assert!(cur.is_empty());
    }

    #[test]
    fn test_vibration_unknown_source() {
        let tables = Tables::new();
        let mut ctx = tables.modern();
        ctx.flags.particle.vibration_source_by_id = false;
        let mut buf = BytesMut::new();
        write_string(&mut buf, "minecraft:sound");
        let mut cur = ByteCursor::new(&buf);
        let err = read_particle_data(&mut cur, ParticleShape::Vibration, &ctx).unwrap_err();
        assert!(matches!(err, CodecError::UnknownIdentifier { .. }));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_item_particle_uses_slot_layout() {
        let tables = Tables::new();
        let ctx = tables.modern();
        let data = [PARTICLE_ITEM as u8, 0x01, 0x05, 0x00, 0x00];
        let mut cur = ByteCursor::new(&data);
        let particle = read_particle(&mut cur, &ctx).unwrap();
        match particle.data {
            ParticleData::Item(Some(item)) => assert_eq!(item.item_id, 5),
            other => panic!("unexpected {:?}", other),
        }
    }
}
