use serde::{Deserialize, Serialize};

/// Bit layout of a packed block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionLayout {
    /// x: 26 bits | z: 26 bits | y: 12 bits (1.14+).
    #[default]
    Modern,
    /// x: 26 bits | y: 12 bits | z: 26 bits (before 1.14).
    Legacy,
}

/// A block position in the world (x, y, z integers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const MIN_XZ: i32 = -(1 << 25);
    pub const MAX_XZ: i32 = (1 << 25) - 1;
    pub const MIN_Y: i32 = -(1 << 11);
    pub const MAX_Y: i32 = (1 << 11) - 1;

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Encode as a 64-bit long (protocol format).
    /// Coordinates outside the representable range are truncated to their field width.
    pub fn encode(&self, layout: PositionLayout) -> u64 {
        let x = self.x as u64 & 0x3FFFFFF;
        let y = self.y as u64 & 0xFFF;
        let z = self.z as u64 & 0x3FFFFFF;
        match layout {
            PositionLayout::Modern => (x << 38) | (z << 12) | y,
            PositionLayout::Legacy => (x << 38) | (y << 26) | z,
        }
    }

    pub fn decode(val: u64, layout: PositionLayout) -> Self {
        match layout {
            PositionLayout::Modern => Self {
                x: sign_extend(val >> 38, 26),
                y: sign_extend(val, 12),
                z: sign_extend(val >> 12, 26),
            },
            PositionLayout::Legacy => Self {
                x: sign_extend(val >> 38, 26),
                y: sign_extend(val >> 26, 12),
                z: sign_extend(val, 26),
            },
        }
    }

    pub fn is_representable(&self) -> bool {
        (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.x)
            && (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.z)
            && (Self::MIN_Y..=Self::MAX_Y).contains(&self.y)
    }
}

/// Interpret the low `bits` bits of `value` as a two's-complement integer.
fn sign_extend(value: u64, bits: u32) -> i32 {
    let shift = 64 - bits;
    ((value << shift) as i64 >> shift) as i32
}

/// A 3D position with double precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A Minecraft resource identifier (e.g., "minecraft:stone").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub namespace: String,
    pub path: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    pub fn minecraft(path: impl Into<String>) -> Self {
        Self::new("minecraft", path)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl std::str::FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((ns, path)) = s.split_once(':') {
            Ok(Self::new(ns, path))
        } else {
            Ok(Self::minecraft(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_known_value() {
        // x=18357644, y=831, z=-20882616 from the protocol documentation
        let packed: u64 = 0b01000110000001110110001100_10110000010101101101001000_001100111111;
        let pos = BlockPos::decode(packed, PositionLayout::Modern);
        assert_eq!(pos, BlockPos::new(18357644, 831, -20882616));
        assert_eq!(pos.encode(PositionLayout::Modern), packed);
    }

    #[test]
    fn test_sign_extension_per_field() {
        for layout in [PositionLayout::Modern, PositionLayout::Legacy] {
            let pos = BlockPos::new(-1, -1, -1);
            assert_eq!(BlockPos::decode(pos.encode(layout), layout), pos);

            let pos = BlockPos::new(BlockPos::MIN_XZ, BlockPos::MAX_Y, BlockPos::MAX_XZ);
            assert_eq!(BlockPos::decode(pos.encode(layout), layout), pos);

            let pos = BlockPos::new(BlockPos::MAX_XZ, BlockPos::MIN_Y, BlockPos::MIN_XZ);
            assert_eq!(BlockPos::decode(pos.encode(layout), layout), pos);
        }
    }

    #[test]
    fn test_layouts_differ() {
        let pos = BlockPos::new(1, 2, 3);
        assert_ne!(
            pos.encode(PositionLayout::Modern),
            pos.encode(PositionLayout::Legacy)
        );
        assert_eq!(pos.encode(PositionLayout::Legacy), (1 << 38) | (2 << 26) | 3);
    }

    #[test]
    fn test_identifier_parse() {
        let id: Identifier = "minecraft:block".parse().unwrap();
        assert_eq!(id, Identifier::minecraft("block"));
        let id: Identifier = "entity".parse().unwrap();
        assert_eq!(id.to_string(), "minecraft:entity");
    }
}
