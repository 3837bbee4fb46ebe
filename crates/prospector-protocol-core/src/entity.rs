use crate::codec::*;
use bytes::{BufMut, BytesMut};
use prospector_types::{ByteCursor, Vec3d};
use uuid::Uuid;

/// Byte layout of an entity spawn record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnLayout {
    /// Spawn Entity from 1.19: pitch, yaw, head yaw, VarInt data.
    Modern,
    /// Spawn Entity before 1.19: pitch, yaw, int data.
    LegacyObject,
    /// Spawn Living Entity before 1.19: yaw, pitch, head pitch, no data.
    LegacyLiving,
}

impl SpawnLayout {
    /// The layout for a spawn packet, given whether the version uses the 1.19 record
    /// and whether the packet is the pre-1.19 living-entity variant.
    pub fn select(modern: bool, living: bool) -> Self {
        match (modern, living) {
            (true, _) => SpawnLayout::Modern,
            (false, false) => SpawnLayout::LegacyObject,
            (false, true) => SpawnLayout::LegacyLiving,
        }
    }
}

/// A decoded spawn record. Angles are in degrees; velocity is in the wire's
/// 1/8000 block per tick units.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpawn {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub entity_type: i32,
    pub position: Vec3d,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub data: i32,
    pub velocity: [i16; 3],
}

pub fn read_entity_spawn(cur: &mut ByteCursor<'_>, layout: SpawnLayout) -> CodecResult<EntitySpawn> {
    cur.transaction(|cur| {
        let entity_id = read_varint(cur).field("entity id")?;
        let uuid = read_uuid(cur).field("entity uuid")?;
        let entity_type = read_varint(cur).field("entity type")?;
        let position = Vec3d::new(
            read_f64(cur).field("x")?,
            read_f64(cur).field("y")?,
            read_f64(cur).field("z")?,
        );
        let (pitch, yaw, head_yaw, data) = match layout {
            SpawnLayout::Modern => {
                let pitch = read_angle(cur).field("pitch")?;
                let yaw = read_angle(cur).field("yaw")?;
                let head_yaw = read_angle(cur).field("head yaw")?;
                let data = read_varint(cur).field("data")?;
                (pitch, yaw, head_yaw, data)
            }
            SpawnLayout::LegacyObject => {
                let pitch = read_angle(cur).field("pitch")?;
                let yaw = read_angle(cur).field("yaw")?;
                let data = read_i32(cur).field("data")?;
                (pitch, yaw, yaw, data)
            }
            SpawnLayout::LegacyLiving => {
                let yaw = read_angle(cur).field("yaw")?;
                let pitch = read_angle(cur).field("pitch")?;
                let head_yaw = read_angle(cur).field("head pitch")?;
                (pitch, yaw, head_yaw, 0)
            }
        };
        let velocity = [
            read_i16(cur).field("velocity")?,
            read_i16(cur).field("velocity")?,
            read_i16(cur).field("velocity")?,
        ];
        Ok(EntitySpawn {
            entity_id,
            uuid,
            entity_type,
            position,
            pitch,
            yaw,
            head_yaw,
            data,
            velocity,
        })
    })
}

pub fn write_entity_spawn(buf: &mut BytesMut, spawn: &EntitySpawn, layout: SpawnLayout) {
    write_varint(buf, spawn.entity_id);
    write_uuid(buf, &spawn.uuid);
    write_varint(buf, spawn.entity_type);
    buf.put_f64(spawn.position.x);
    buf.put_f64(spawn.position.y);
    buf.put_f64(spawn.position.z);
    match layout {
        SpawnLayout::Modern => {
            write_angle(buf, spawn.pitch);
            write_angle(buf, spawn.yaw);
            write_angle(buf, spawn.head_yaw);
            write_varint(buf, spawn.data);
        }
        SpawnLayout::LegacyObject => {
            write_angle(buf, spawn.pitch);
            write_angle(buf, spawn.yaw);
            buf.put_i32(spawn.data);
        }
        SpawnLayout::LegacyLiving => {
            write_angle(buf, spawn.yaw);
            write_angle(buf, spawn.pitch);
            write_angle(buf, spawn.head_yaw);
        }
    }
    for v in spawn.velocity {
        buf.put_i16(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntitySpawn {
        EntitySpawn {
            entity_id: 1234,
            uuid: Uuid::from_u128(0x1234_5678),
            entity_type: 57,
            position: Vec3d::new(10.5, 64.0, -3.25),
            pitch: 45.0,
            yaw: 180.0,
            head_yaw: 90.0,
            data: 3,
            velocity: [100, -200, 0],
        }
    }

    #[test]
    fn test_modern_roundtrip() {
        let spawn = sample();
        let mut buf = BytesMut::new();
        write_entity_spawn(&mut buf, &spawn, SpawnLayout::Modern);
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(read_entity_spawn(&mut cur, SpawnLayout::Modern).unwrap(), spawn);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_legacy_living_angle_order() {
        let spawn = sample();
        let mut buf = BytesMut::new();
        write_entity_spawn(&mut buf, &spawn, SpawnLayout::LegacyLiving);
        // varint id (2) + uuid (16) + type (1) + xyz (24), then yaw first
        assert_eq!(buf[43], 128);
        assert_eq!(buf[44], 32);

        let mut cur = ByteCursor::new(&buf);
        let decoded = read_entity_spawn(&mut cur, SpawnLayout::LegacyLiving).unwrap();
        assert_eq!(decoded.yaw, 180.0);
        assert_eq!(decoded.pitch, 45.0);
        assert_eq!(decoded.data, 0);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_legacy_object_int_data() {
        let spawn = EntitySpawn {
            data: -1,
            head_yaw: 180.0,
            ..sample()
        };
        let mut buf = BytesMut::new();
        write_entity_spawn(&mut buf, &spawn, SpawnLayout::LegacyObject);
        let mut cur = ByteCursor::new(&buf);
        let decoded = read_entity_spawn(&mut cur, SpawnLayout::LegacyObject).unwrap();
        assert_eq!(decoded, spawn);
    }

    #[test]
    fn test_truncated_names_field() {
        let spawn = sample();
        let mut buf = BytesMut::new();
        write_entity_spawn(&mut buf, &spawn, SpawnLayout::Modern);
        let cut = &buf[..buf.len() - 1];
        let mut cur = ByteCursor::new(cut);
        let err = read_entity_spawn(&mut cur, SpawnLayout::Modern).unwrap_err();
        assert_eq!(err.field_name(), Some("velocity"));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_layout_select() {
        assert_eq!(SpawnLayout::select(true, true), SpawnLayout::Modern);
        assert_eq!(SpawnLayout::select(false, true), SpawnLayout::LegacyLiving);
        assert_eq!(SpawnLayout::select(false, false), SpawnLayout::LegacyObject);
    }
}
