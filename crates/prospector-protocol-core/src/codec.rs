use bytes::{BufMut, BytesMut};
use prospector_nbt::NbtError;
use prospector_types::{BlockPos, ByteCursor, Identifier, PositionLayout, Truncated};
use thiserror::Error;
use uuid::Uuid;

/// Longest legal VarInt encoding.
pub const VARINT_MAX_BYTES: usize = 5;
/// Longest legal VarLong encoding.
pub const VARLONG_MAX_BYTES: usize = 10;
/// Default character limit for protocol strings.
pub const MAX_STRING_CHARS: usize = 32767;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedInt {
    #[error("variable-length integer longer than {max_bytes} bytes")]
    TooLong { max_bytes: usize },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    MalformedInt(#[from] MalformedInt),
    #[error("Not enough data: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("String too long: {0} > {1}")]
    StringTooLong(usize, usize),
    #[error("Negative length {0}")]
    NegativeLength(i32),
    #[error("Invalid UTF-8 in string")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Unknown {kind} id {id}")]
    UnknownTypeId { kind: &'static str, id: i32 },
    #[error("Unknown {kind} identifier {id:?}")]
    UnknownIdentifier { kind: &'static str, id: String },
    #[error("Nesting deeper than {0}")]
    TooDeep(usize),
    #[error("{0} unread bytes after packet body")]
    TrailingBytes(usize),
    #[error("Cannot encode {0}")]
    Unencodable(&'static str),
    #[error("NBT error: {0}")]
    Nbt(#[from] NbtError),
    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// The innermost error, with all field context removed.
    pub fn root_cause(&self) -> &CodecError {
        let mut err = self;
        while let CodecError::Field { source, .. } = err {
            err = source;
        }
        err
    }

    /// The outermost field name, if any context was attached.
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            CodecError::Field { field, .. } => Some(field),
            _ => None,
        }
    }

    /// True when more input could make the same decode succeed.
    pub fn is_truncated(&self) -> bool {
        matches!(
            self.root_cause(),
            CodecError::Truncated { .. } | CodecError::Nbt(NbtError::Truncated { .. })
        )
    }
}

impl From<Truncated> for CodecError {
    fn from(t: Truncated) -> Self {
        CodecError::Truncated {
            needed: t.needed,
            available: t.available,
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Attach the name of the field being decoded to an error.
pub trait FieldContext<T> {
    fn field(self, name: &'static str) -> CodecResult<T>;
}

impl<T, E: Into<CodecError>> FieldContext<T> for Result<T, E> {
    fn field(self, name: &'static str) -> CodecResult<T> {
        self.map_err(|e| CodecError::Field {
            field: name,
            source: Box::new(e.into()),
        })
    }
}

/// Read a VarInt from the buffer.
pub fn read_varint(cur: &mut ByteCursor<'_>) -> CodecResult<i32> {
    let mut peek = *cur;
    let mut result: i32 = 0;
    for i in 0..VARINT_MAX_BYTES {
        let byte = peek.take_u8()?;
        result |= ((byte & 0x7F) as i32) << (7 * i);
        if byte & 0x80 == 0 {
            *cur = peek;
            return Ok(result);
        }
    }
    Err(MalformedInt::TooLong {
        max_bytes: VARINT_MAX_BYTES,
    }
    .into())
}

/// Write a VarInt to the buffer.
pub fn write_varint(buf: &mut BytesMut, mut value: i32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Calculate the byte length of a VarInt.
pub fn varint_len(value: i32) -> usize {
    let mut val = value as u32;
    let mut len = 0;
    loop {
        len += 1;
        val >>= 7;
        if val == 0 {
            break;
        }
    }
    len
}

/// Read a VarLong from the buffer.
pub fn read_varlong(cur: &mut ByteCursor<'_>) -> CodecResult<i64> {
    let mut peek = *cur;
    let mut result: i64 = 0;
    for i in 0..VARLONG_MAX_BYTES {
        let byte = peek.take_u8()?;
        result |= ((byte & 0x7F) as i64) << (7 * i);
        if byte & 0x80 == 0 {
            *cur = peek;
            return Ok(result);
        }
    }
    Err(MalformedInt::TooLong {
        max_bytes: VARLONG_MAX_BYTES,
    }
    .into())
}

/// Write a VarLong to the buffer.
pub fn write_varlong(buf: &mut BytesMut, mut value: i64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u64) >> 7) as i64;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn varlong_len(value: i64) -> usize {
    let bits = 64 - (value as u64).leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

macro_rules! read_be_impl {
    ($ty:ty, $fn_name:ident) => {
        pub fn $fn_name(cur: &mut ByteCursor<'_>) -> CodecResult<$ty> {
            Ok(<$ty>::from_be_bytes(cur.take_array()?))
        }
    };
}

read_be_impl!(u8, read_u8);
read_be_impl!(i8, read_i8);
read_be_impl!(u16, read_u16);
read_be_impl!(i16, read_i16);
read_be_impl!(i32, read_i32);
read_be_impl!(i64, read_i64);
read_be_impl!(u64, read_u64);
read_be_impl!(f32, read_f32);
read_be_impl!(f64, read_f64);

/// Read a rotation angle in 1/256ths of a turn, as degrees.
pub fn read_angle(cur: &mut ByteCursor<'_>) -> CodecResult<f32> {
    Ok(cur.take_u8()? as f32 * 360.0 / 256.0)
}

pub fn write_angle(buf: &mut BytesMut, degrees: f32) {
    let steps = (degrees * 256.0 / 360.0).round() as i64;
    buf.put_u8(steps.rem_euclid(256) as u8);
}

/// Any non-zero byte reads as true.
pub fn read_bool(cur: &mut ByteCursor<'_>) -> CodecResult<bool> {
    Ok(cur.take_u8()? != 0)
}

pub fn write_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(value as u8);
}

/// Read a VarInt length prefix, rejecting negative values.
pub fn read_len(cur: &mut ByteCursor<'_>) -> CodecResult<usize> {
    cur.transaction(|cur| {
        let len = read_varint(cur)?;
        usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))
    })
}

/// Read a protocol string (varint-prefixed UTF-8).
pub fn read_string(cur: &mut ByteCursor<'_>, max_len: usize) -> CodecResult<String> {
    cur.transaction(|cur| {
        let len = read_len(cur)?;
        if len > max_len * 4 {
            return Err(CodecError::StringTooLong(len, max_len));
        }
        if len == 0 {
            return Ok(String::new());
        }
        let s = std::str::from_utf8(cur.take(len)?)?;
        let chars = s.chars().count();
        if chars > max_len {
            return Err(CodecError::StringTooLong(chars, max_len));
        }
        Ok(s.to_owned())
    })
}

/// Write a protocol string.
pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.put_slice(s.as_bytes());
}

pub fn read_identifier(cur: &mut ByteCursor<'_>) -> CodecResult<Identifier> {
    let raw = read_string(cur, MAX_STRING_CHARS)?;
    // FromStr for Identifier cannot fail
    Ok(raw.parse().unwrap_or_else(|never: std::convert::Infallible| match never {}))
}

pub fn write_identifier(buf: &mut BytesMut, id: &Identifier) {
    write_string(buf, &id.to_string());
}

/// Read a UUID (128 bits, big endian).
pub fn read_uuid(cur: &mut ByteCursor<'_>) -> CodecResult<Uuid> {
    Ok(Uuid::from_bytes(cur.take_array()?))
}

/// Write a UUID.
pub fn write_uuid(buf: &mut BytesMut, uuid: &Uuid) {
    buf.put_slice(uuid.as_bytes());
}

/// Read a byte array with varint length prefix.
pub fn read_byte_array(cur: &mut ByteCursor<'_>) -> CodecResult<Vec<u8>> {
    cur.transaction(|cur| {
        let len = read_len(cur)?;
        Ok(cur.take(len)?.to_vec())
    })
}

/// Write a byte array with varint length prefix.
pub fn write_byte_array(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as i32);
    buf.put_slice(data);
}

/// Read a packed block position.
pub fn read_position(cur: &mut ByteCursor<'_>, layout: PositionLayout) -> CodecResult<BlockPos> {
    Ok(BlockPos::decode(read_u64(cur)?, layout))
}

pub fn write_position(buf: &mut BytesMut, pos: &BlockPos, layout: PositionLayout) {
    buf.put_u64(pos.encode(layout));
}

/// Read a bit set: a VarInt count of longs.
pub fn read_bitset(cur: &mut ByteCursor<'_>) -> CodecResult<Vec<i64>> {
    cur.transaction(|cur| {
        let len = read_len(cur)?;
        let bytes = cur.take(len.saturating_mul(8))?;
        Ok(bytes
            .chunks_exact(8)
            .map(|c| i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect())
    })
}

pub fn write_bitset(buf: &mut BytesMut, words: &[i64]) {
    write_varint(buf, words.len() as i32);
    for word in words {
        buf.put_i64(*word);
    }
}

/// Read a length-prefixed list, bounding the up-front allocation by what is left to read.
pub fn read_list<'a, T>(
    cur: &mut ByteCursor<'a>,
    mut item: impl FnMut(&mut ByteCursor<'a>) -> CodecResult<T>,
) -> CodecResult<Vec<T>> {
    cur.transaction(|cur| {
        let len = read_len(cur)?;
        let mut out = Vec::with_capacity(len.min(cur.remaining()));
        for _ in 0..len {
            out.push(item(cur)?);
        }
        Ok(out)
    })
}
