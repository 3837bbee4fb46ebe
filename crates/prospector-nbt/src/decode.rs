use crate::nbt::*;
use crate::{NbtError, NbtResult};
use prospector_types::ByteCursor;

/// Compounds and lists nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 512;

/// Read a root tag.
///
/// A leading `TAG_END` byte means "no data" and yields [`NbtValue::End`].
/// On error the cursor is left where it was.
pub fn read_root(cur: &mut ByteCursor<'_>, mode: RootMode) -> NbtResult<NbtValue> {
    read_root_named(cur, mode).map(|(_, value)| value)
}

/// Read a root tag, also returning the root name (empty in anonymous mode).
pub fn read_root_named(cur: &mut ByteCursor<'_>, mode: RootMode) -> NbtResult<(String, NbtValue)> {
    cur.transaction(|cur| {
        let tag = cur.take_u8()?;
        if tag == TAG_END {
            return Ok((String::new(), NbtValue::End));
        }
        if tag > TAG_LONG_ARRAY {
            return Err(NbtError::UnknownTag(tag));
        }
        let name = match mode {
            RootMode::Named => {
                if tag != TAG_COMPOUND {
                    return Err(NbtError::InvalidRoot(tag));
                }
                read_nbt_string(cur)?
            }
            RootMode::Anonymous => {
                if tag != TAG_COMPOUND && tag != TAG_STRING {
                    return Err(NbtError::InvalidRoot(tag));
                }
                String::new()
            }
        };
        let value = read_payload(cur, tag, 0)?;
        Ok((name, value))
    })
}

/// Read the payload of a value whose tag id is already known.
pub fn read_payload(cur: &mut ByteCursor<'_>, tag: u8, depth: usize) -> NbtResult<NbtValue> {
    if depth > MAX_DEPTH {
        return Err(NbtError::TooDeep(MAX_DEPTH));
    }
    let value = match tag {
        TAG_END => return Err(NbtError::UnexpectedEnd),
        TAG_BYTE => NbtValue::Byte(cur.take_u8()? as i8),
        TAG_SHORT => NbtValue::Short(i16::from_be_bytes(cur.take_array()?)),
        TAG_INT => NbtValue::Int(read_i32(cur)?),
        TAG_LONG => NbtValue::Long(i64::from_be_bytes(cur.take_array()?)),
        TAG_FLOAT => NbtValue::Float(f32::from_be_bytes(cur.take_array()?)),
        TAG_DOUBLE => NbtValue::Double(f64::from_be_bytes(cur.take_array()?)),
        TAG_BYTE_ARRAY => {
            let len = read_len(cur)?;
            let bytes = cur.take(len)?;
            NbtValue::ByteArray(bytes.iter().map(|b| *b as i8).collect())
        }
        TAG_STRING => NbtValue::String(read_nbt_string(cur)?),
        TAG_LIST => {
            let elem_tag = cur.take_u8()?;
            let len = read_len(cur)?;
            if elem_tag > TAG_LONG_ARRAY {
                return Err(NbtError::UnknownTag(elem_tag));
            }
            if elem_tag == TAG_END && len > 0 {
                return Err(NbtError::UnexpectedEnd);
            }
            // every element is at least one byte, so the remaining input bounds the allocation
            let mut items = Vec::with_capacity(len.min(cur.remaining()));
            for _ in 0..len {
                items.push(read_payload(cur, elem_tag, depth + 1)?);
            }
            NbtValue::List(items)
        }
        TAG_COMPOUND => {
            let mut entries = Vec::new();
            loop {
                let field_tag = cur.take_u8()?;
                if field_tag == TAG_END {
                    break;
                }
                if field_tag > TAG_LONG_ARRAY {
                    return Err(NbtError::UnknownTag(field_tag));
                }
                let name = read_nbt_string(cur)?;
                let value = read_payload(cur, field_tag, depth + 1)?;
                compound_insert(&mut entries, name, value);
            }
            NbtValue::Compound(entries)
        }
        TAG_INT_ARRAY => {
            let len = read_len(cur)?;
            let bytes = cur.take(len.saturating_mul(4))?;
            NbtValue::IntArray(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            )
        }
        TAG_LONG_ARRAY => {
            let len = read_len(cur)?;
            let bytes = cur.take(len.saturating_mul(8))?;
            NbtValue::LongArray(
                bytes
                    .chunks_exact(8)
                    .map(|c| i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            )
        }
        other => return Err(NbtError::UnknownTag(other)),
    };
    Ok(value)
}

fn read_i32(cur: &mut ByteCursor<'_>) -> NbtResult<i32> {
    Ok(i32::from_be_bytes(cur.take_array()?))
}

fn read_len(cur: &mut ByteCursor<'_>) -> NbtResult<usize> {
    let len = read_i32(cur)?;
    usize::try_from(len).map_err(|_| NbtError::NegativeLength(len))
}

fn read_nbt_string(cur: &mut ByteCursor<'_>) -> NbtResult<String> {
    let len = u16::from_be_bytes(cur.take_array()?) as usize;
    let bytes = cur.take(len)?;
    // Java writes modified UTF-8: surrogate pairs, and C0 80 for NUL
    cesu8::from_java_cesu8(bytes)
        .map(|s| s.into_owned())
        .map_err(|_| NbtError::InvalidString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{nbt_compound, nbt_list};
    use bytes::BytesMut;

    fn roundtrip(value: &NbtValue, mode: RootMode) -> NbtValue {
        let mut buf = BytesMut::new();
        value.write_root(mode, &mut buf).unwrap();
        let mut cur = ByteCursor::new(&buf);
        let decoded = read_root(&mut cur, mode).unwrap();
        assert!(cur.is_empty(), "root did not consume all bytes");
        decoded
    }

    fn sample() -> NbtValue {
        nbt_compound! {
            "byte" => NbtValue::Byte(-3),
            "short" => NbtValue::Short(1234),
            "long" => NbtValue::Long(i64::MIN),
            "float" => NbtValue::Float(0.5),
            "double" => NbtValue::Double(-2.25),
            "bytes" => NbtValue::ByteArray(vec![1, -1, 0]),
            "ints" => NbtValue::IntArray(vec![i32::MAX, 7]),
            "longs" => NbtValue::LongArray(vec![]),
            "list" => nbt_list![NbtValue::String("a".into()), NbtValue::String("b".into())],
            "empty" => nbt_list![],
            "nested" => nbt_compound! { "inner" => NbtValue::Int(5) },
        }
    }

    #[test]
    fn test_roundtrip_both_modes() {
        let value = sample();
        assert_eq!(roundtrip(&value, RootMode::Named), value);
        assert_eq!(roundtrip(&value, RootMode::Anonymous), value);
    }

    #[test]
    fn test_named_root_name_is_returned() {
        let mut buf = BytesMut::new();
        nbt_compound! { "x" => NbtValue::Byte(1) }
            .write_root_named("hello", &mut buf)
            .unwrap();
        let mut cur = ByteCursor::new(&buf);
        let (name, _) = read_root_named(&mut cur, RootMode::Named).unwrap();
        assert_eq!(name, "hello");
    }

    #[test]
    fn test_anonymous_string_root() {
        let value = NbtValue::String("A server".into());
        assert_eq!(roundtrip(&value, RootMode::Anonymous), value);
    }

    #[test]
    fn test_end_root_is_no_data() {
        let data = [TAG_END, 0xAA];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(read_root(&mut cur, RootMode::Named).unwrap(), NbtValue::End);
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let data = [
            TAG_COMPOUND, // anonymous root
            TAG_INT, 0, 1, b'x', 0, 0, 0, 1,
            TAG_INT, 0, 1, b'x', 0, 0, 0, 2,
            TAG_END,
        ];
        let mut cur = ByteCursor::new(&data);
        let value = read_root(&mut cur, RootMode::Anonymous).unwrap();
        assert_eq!(value, nbt_compound! { "x" => NbtValue::Int(2) });
    }

    #[test]
    fn test_unknown_tag() {
        let data = [TAG_COMPOUND, 13, 0, 0, TAG_END];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_root(&mut cur, RootMode::Anonymous),
            Err(NbtError::UnknownTag(13))
        ));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_truncated_leaves_cursor() {
        let mut buf = BytesMut::new();
        sample().write_root(RootMode::Named, &mut buf).unwrap();
        let cut = &buf[..buf.len() - 3];
        let mut cur = ByteCursor::new(cut);
        assert!(matches!(
            read_root(&mut cur, RootMode::Named),
            Err(NbtError::Truncated { .. })
        ));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_named_mode_rejects_string_root() {
        let data = [TAG_STRING, 0, 0, 0, 1, b'a'];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_root(&mut cur, RootMode::Named),
            Err(NbtError::InvalidRoot(TAG_STRING))
        ));
    }

    #[test]
    fn test_empty_list_of_end() {
        let data = [TAG_END, 0, 0, 0, 0];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(read_payload(&mut cur, TAG_LIST, 0).unwrap(), NbtValue::List(vec![]));
        assert!(cur.is_empty());
    }

    #[test]
    fn test_list_of_end_with_items_rejected() {
        let data = [TAG_END, 0, 0, 0, 2];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_payload(&mut cur, TAG_LIST, 0),
            Err(NbtError::UnexpectedEnd)
        ));
    }

    #[test]
    fn test_modified_utf8_strings() {
        // U+1F600 as a surrogate pair, three bytes each
        let data = [0, 6, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(
            read_payload(&mut cur, TAG_STRING, 0).unwrap(),
            NbtValue::String("\u{1F600}".into())
        );

        let data = [0, 3, b'a', 0xC0, 0x80];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(
            read_payload(&mut cur, TAG_STRING, 0).unwrap(),
            NbtValue::String("a\0".into())
        );
    }

    #[test]
    fn test_strings_written_as_modified_utf8() {
        let value = NbtValue::String("a\0\u{1F600}".into());
        let mut buf = BytesMut::new();
        value.write_root_network(&mut buf).unwrap();
        assert_eq!(
            &buf[..],
            &[TAG_STRING, 0, 9, b'a', 0xC0, 0x80, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]
        );
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(read_root(&mut cur, RootMode::Anonymous).unwrap(), value);
    }

    #[test]
    fn test_invalid_string_rejected() {
        let data = [0, 2, 0xFF, 0xFE];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_payload(&mut cur, TAG_STRING, 0),
            Err(NbtError::InvalidString)
        ));
    }

    #[test]
    fn test_negative_length_rejected() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_payload(&mut cur, TAG_INT_ARRAY, 0),
            Err(NbtError::NegativeLength(-1))
        ));
    }

    #[test]
    fn test_depth_limit() {
        // each chunk is a list payload declaring one nested list
        let mut data = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            data.extend_from_slice(&[TAG_LIST, 0, 0, 0, 1]);
        }
        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_payload(&mut cur, TAG_LIST, 0),
            Err(NbtError::TooDeep(MAX_DEPTH))
        ));
    }
}
