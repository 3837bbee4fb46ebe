use crate::{NbtError, NbtResult};
use bytes::{BufMut, BytesMut};

/// NBT tag type IDs.
pub const TAG_END: u8 = 0;
pub const TAG_BYTE: u8 = 1;
pub const TAG_SHORT: u8 = 2;
pub const TAG_INT: u8 = 3;
pub const TAG_LONG: u8 = 4;
pub const TAG_FLOAT: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_BYTE_ARRAY: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_LIST: u8 = 9;
pub const TAG_COMPOUND: u8 = 10;
pub const TAG_INT_ARRAY: u8 = 11;
pub const TAG_LONG_ARRAY: u8 = 12;

/// How the root tag is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMode {
    /// Tag id, u16-prefixed root name, payload. Files and network before 1.20.2.
    Named,
    /// Tag id and payload with no name. Network from 1.20.2; a bare string
    /// root is also accepted, as used by text components from 1.20.3.
    Anonymous,
}

/// An NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    /// Only valid as a whole root, where it stands for "no data".
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtValue>),
    Compound(Vec<(String, NbtValue)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtValue {
    pub fn tag_id(&self) -> u8 {
        match self {
            NbtValue::End => TAG_END,
            NbtValue::Byte(_) => TAG_BYTE,
            NbtValue::Short(_) => TAG_SHORT,
            NbtValue::Int(_) => TAG_INT,
            NbtValue::Long(_) => TAG_LONG,
            NbtValue::Float(_) => TAG_FLOAT,
            NbtValue::Double(_) => TAG_DOUBLE,
            NbtValue::ByteArray(_) => TAG_BYTE_ARRAY,
            NbtValue::String(_) => TAG_STRING,
            NbtValue::List(_) => TAG_LIST,
            NbtValue::Compound(_) => TAG_COMPOUND,
            NbtValue::IntArray(_) => TAG_INT_ARRAY,
            NbtValue::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, NbtValue::End)
    }

    /// Look up a compound field by name.
    pub fn get(&self, key: &str) -> Option<&NbtValue> {
        match self {
            NbtValue::Compound(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Insert into a compound. An existing key keeps its position and takes the new value.
    /// Returns false if `self` is not a compound.
    pub fn insert(&mut self, key: impl Into<String>, value: NbtValue) -> bool {
        match self {
            NbtValue::Compound(entries) => {
                compound_insert(entries, key.into(), value);
                true
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            NbtValue::Byte(v) => Some(*v as i32),
            NbtValue::Short(v) => Some(*v as i32),
            NbtValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Write this value as a root tag in the given mode.
    /// A named root uses the empty name.
    pub fn write_root(&self, mode: RootMode, buf: &mut BytesMut) -> NbtResult<()> {
        match mode {
            RootMode::Named => self.write_root_named("", buf),
            RootMode::Anonymous => self.write_root_network(buf),
        }
    }

    /// Write this value as a nameless root tag for network protocol.
    pub fn write_root_network(&self, buf: &mut BytesMut) -> NbtResult<()> {
        // Network NBT in 1.20.2+: root tag with type byte, but NO name
        match self {
            NbtValue::End => {
                buf.put_u8(TAG_END);
                Ok(())
            }
            NbtValue::Compound(_) | NbtValue::String(_) => {
                buf.put_u8(self.tag_id());
                self.write_payload(buf)
            }
            other => Err(NbtError::InvalidRoot(other.tag_id())),
        }
    }

    /// Write this value as a full named root tag (for files and pre-1.20.2 network).
    pub fn write_root_named(&self, name: &str, buf: &mut BytesMut) -> NbtResult<()> {
        match self {
            NbtValue::End => {
                buf.put_u8(TAG_END);
                Ok(())
            }
            NbtValue::Compound(_) => {
                buf.put_u8(TAG_COMPOUND);
                write_nbt_string(name, buf)?;
                self.write_payload(buf)
            }
            other => Err(NbtError::InvalidRoot(other.tag_id())),
        }
    }

    /// Write just the payload (no tag type or name).
    pub fn write_payload(&self, buf: &mut BytesMut) -> NbtResult<()> {
        match self {
            NbtValue::End => return Err(NbtError::UnexpectedEnd),
            NbtValue::Byte(v) => buf.put_i8(*v),
            NbtValue::Short(v) => buf.put_i16(*v),
            NbtValue::Int(v) => buf.put_i32(*v),
            NbtValue::Long(v) => buf.put_i64(*v),
            NbtValue::Float(v) => buf.put_f32(*v),
            NbtValue::Double(v) => buf.put_f64(*v),
            NbtValue::ByteArray(v) => {
                buf.put_i32(array_len(v.len())?);
                for b in v {
                    buf.put_i8(*b);
                }
            }
            NbtValue::String(v) => {
                write_nbt_string(v, buf)?;
            }
            NbtValue::List(v) => {
                let elem_tag = list_tag(v)?;
                buf.put_u8(elem_tag);
                buf.put_i32(array_len(v.len())?);
                for item in v {
                    item.write_payload(buf)?;
                }
            }
            NbtValue::Compound(entries) => {
                for (name, value) in entries {
                    if value.is_end() {
                        return Err(NbtError::UnexpectedEnd);
                    }
                    buf.put_u8(value.tag_id());
                    write_nbt_string(name, buf)?;
                    value.write_payload(buf)?;
                }
                buf.put_u8(TAG_END);
            }
            NbtValue::IntArray(v) => {
                buf.put_i32(array_len(v.len())?);
                for i in v {
                    buf.put_i32(*i);
                }
            }
            NbtValue::LongArray(v) => {
                buf.put_i32(array_len(v.len())?);
                for l in v {
                    buf.put_i64(*l);
                }
            }
        }
        Ok(())
    }
}

/// Element tag of a list; every element must share it.
fn list_tag(items: &[NbtValue]) -> NbtResult<u8> {
    let Some(first) = items.first() else {
        return Ok(TAG_END);
    };
    let expected = first.tag_id();
    if expected == TAG_END {
        return Err(NbtError::UnexpectedEnd);
    }
    for item in &items[1..] {
        let found = item.tag_id();
        if found != expected {
            return Err(NbtError::HeterogeneousList { expected, found });
        }
    }
    Ok(expected)
}

fn array_len(len: usize) -> NbtResult<i32> {
    i32::try_from(len).map_err(|_| NbtError::ArrayTooLong(len))
}

pub(crate) fn compound_insert(entries: &mut Vec<(String, NbtValue)>, key: String, value: NbtValue) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

fn write_nbt_string(s: &str, buf: &mut BytesMut) -> NbtResult<()> {
    let bytes = cesu8::to_java_cesu8(s);
    let len = u16::try_from(bytes.len()).map_err(|_| NbtError::StringTooLong(bytes.len()))?;
    buf.put_u16(len);
    buf.put_slice(&bytes);
    Ok(())
}

/// Helper macro for building compound tags.
#[macro_export]
macro_rules! nbt_compound {
    ($($key:expr => $val:expr),* $(,)?) => {
        $crate::NbtValue::Compound(vec![
            $(($key.into(), $val)),*
        ])
    };
}

/// Helper macro for building list tags.
#[macro_export]
macro_rules! nbt_list {
    ($($val:expr),* $(,)?) => {
        $crate::NbtValue::List(vec![$($val),*])
    };
}
