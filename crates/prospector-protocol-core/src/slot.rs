use crate::codec::*;
use crate::{ComponentShape, SlotLayout, WireContext};
use bytes::{BufMut, BytesMut};
use prospector_nbt::{read_root, NbtValue, RootMode};
use prospector_types::{ByteCursor, Identifier};

/// Sentinel item id that also means "no item" in the legacy layout.
const LEGACY_EMPTY_ITEM_ID: i32 = -1;

/// How deep item lists (bundles inside bundles) may nest.
pub const MAX_ITEM_NESTING: usize = 16;

/// An item stack in an inventory slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStack {
    /// Item registry ID.
    pub item_id: i32,
    pub count: i32,
    pub data: ItemData,
}

/// Extra item data; which variant appears is fixed by the slot layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    /// `None` when the root tag byte was `TAG_END`.
    Legacy(Option<NbtValue>),
    Components(ComponentPatch),
}

/// Structured components added to and removed from an item's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentPatch {
    pub added: Vec<(i32, ComponentValue)>,
    pub removed: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    Empty,
    VarInt(i32),
    Int(i32),
    Bool(bool),
    Nbt(NbtValue),
    Text(NbtValue),
    TextList(Vec<NbtValue>),
    Enchantments {
        levels: Vec<(i32, i32)>,
        show_in_tooltip: bool,
    },
    DyedColor {
        rgb: i32,
        show_in_tooltip: bool,
    },
    Identifier(Identifier),
    Items(Vec<Option<ItemStack>>),
}

impl ItemStack {
    pub fn new(item_id: i32, count: i32, data: ItemData) -> Self {
        Self {
            item_id,
            count,
            data,
        }
    }

    /// Look up an added component by id.
    pub fn component(&self, component_id: i32) -> Option<&ComponentValue> {
        match &self.data {
            ItemData::Components(patch) => patch
                .added
                .iter()
                .find(|(id, _)| *id == component_id)
                .map(|(_, v)| v),
            ItemData::Legacy(_) => None,
        }
    }
}

/// Read a Slot in whichever layout the context selects.
/// Returns None for empty slots.
pub fn read_slot(cur: &mut ByteCursor<'_>, ctx: &WireContext<'_>) -> CodecResult<Option<ItemStack>> {
    match ctx.flags.slot_layout {
        SlotLayout::Legacy => read_legacy_slot(cur, ctx.flags.nbt_root),
        SlotLayout::Structured => read_structured_slot(cur, ctx),
    }
}

pub fn write_slot(buf: &mut BytesMut, slot: &Option<ItemStack>, ctx: &WireContext<'_>) -> CodecResult<()> {
    match ctx.flags.slot_layout {
        SlotLayout::Legacy => write_legacy_slot(buf, slot, ctx.flags.nbt_root),
        SlotLayout::Structured => write_structured_slot(buf, slot),
    }
}

/// Read a Slot in the NBT-carrying layout (1.13.2 to 1.20.4).
/// Both a false presence flag and an item id of -1 mean "no item".
pub fn read_legacy_slot(cur: &mut ByteCursor<'_>, nbt_root: RootMode) -> CodecResult<Option<ItemStack>> {
    cur.transaction(|cur| {
        if !read_bool(cur).field("slot present")? {
            return Ok(None);
        }
        let item_id = read_varint(cur).field("slot item id")?;
        if item_id == LEGACY_EMPTY_ITEM_ID {
            return Ok(None);
        }
        let count = read_u8(cur).field("slot count")? as i32;
        let nbt = read_root(cur, nbt_root).field("slot nbt")?;
        let nbt = if nbt.is_end() { None } else { Some(nbt) };
        Ok(Some(ItemStack::new(item_id, count, ItemData::Legacy(nbt))))
    })
}

pub fn write_legacy_slot(buf: &mut BytesMut, slot: &Option<ItemStack>, nbt_root: RootMode) -> CodecResult<()> {
    let Some(item) = slot else {
        write_bool(buf, false);
        return Ok(());
    };
    let nbt = match &item.data {
        ItemData::Legacy(nbt) => nbt.as_ref(),
        ItemData::Components(_) => return Err(CodecError::Unencodable("component item in legacy slot")),
    };
    let count = u8::try_from(item.count).map_err(|_| CodecError::Unencodable("slot count"))?;
    write_bool(buf, true);
    write_varint(buf, item.item_id);
    buf.put_u8(count);
    match nbt {
        Some(nbt) => nbt.write_root(nbt_root, buf)?,
        None => buf.put_u8(0),
    }
    Ok(())
}

/// Read a Slot in the structured-component layout (1.20.5+).
/// A count of zero or less is an empty slot and nothing further is read.
pub fn read_structured_slot(cur: &mut ByteCursor<'_>, ctx: &WireContext<'_>) -> CodecResult<Option<ItemStack>> {
    read_structured_slot_at(cur, ctx, 0)
}

fn read_structured_slot_at(
    cur: &mut ByteCursor<'_>,
    ctx: &WireContext<'_>,
    depth: usize,
) -> CodecResult<Option<ItemStack>> {
    if depth > MAX_ITEM_NESTING {
        return Err(CodecError::TooDeep(MAX_ITEM_NESTING));
    }
    cur.transaction(|cur| {
        let count = read_varint(cur).field("slot count")?;
        if count <= 0 {
            return Ok(None);
        }
        let item_id = read_varint(cur).field("slot item id")?;
        let add_count = read_len(cur).field("slot added components")?;
        let remove_count = read_len(cur).field("slot removed components")?;

        let mut patch = ComponentPatch {
            added: Vec::with_capacity(add_count.min(cur.remaining())),
            removed: Vec::with_capacity(remove_count.min(cur.remaining())),
        };
        for _ in 0..add_count {
            let component_id = read_varint(cur).field("component id")?;
            let shape = ctx.components.shape(component_id).ok_or(CodecError::UnknownTypeId {
                kind: "item component",
                id: component_id,
            })?;
            let value = read_component(cur, shape, ctx, depth).field("component value")?;
            patch.added.push((component_id, value));
        }
        for _ in 0..remove_count {
            patch.removed.push(read_varint(cur).field("removed component id")?);
        }
        Ok(Some(ItemStack::new(item_id, count, ItemData::Components(patch))))
    })
}

pub fn write_structured_slot(buf: &mut BytesMut, slot: &Option<ItemStack>) -> CodecResult<()> {
    let Some(item) = slot.as_ref().filter(|item| item.count > 0) else {
        write_varint(buf, 0); // item_count = 0 = empty
        return Ok(());
    };
    let empty = ComponentPatch::default();
    let patch = match &item.data {
        ItemData::Components(patch) => patch,
        // an item with no extra data needs no components
        ItemData::Legacy(None) => &empty,
        ItemData::Legacy(Some(_)) => {
            return Err(CodecError::Unencodable("NBT item in structured slot"))
        }
    };
    write_varint(buf, item.count);
    write_varint(buf, item.item_id);
    write_varint(buf, patch.added.len() as i32);
    write_varint(buf, patch.removed.len() as i32);
    for (component_id, value) in &patch.added {
        write_varint(buf, *component_id);
        write_component(buf, value)?;
    }
    for component_id in &patch.removed {
        write_varint(buf, *component_id);
    }
    Ok(())
}

fn read_text(cur: &mut ByteCursor<'_>) -> CodecResult<NbtValue> {
    Ok(read_root(cur, RootMode::Anonymous)?)
}

fn read_component(
    cur: &mut ByteCursor<'_>,
    shape: ComponentShape,
    ctx: &WireContext<'_>,
    depth: usize,
) -> CodecResult<ComponentValue> {
    let value = match shape {
        ComponentShape::Empty => ComponentValue::Empty,
        ComponentShape::VarInt => ComponentValue::VarInt(read_varint(cur)?),
        ComponentShape::Int => ComponentValue::Int(read_i32(cur)?),
        ComponentShape::Bool => ComponentValue::Bool(read_bool(cur)?),
        ComponentShape::Nbt => ComponentValue::Nbt(read_root(cur, RootMode::Anonymous)?),
        ComponentShape::Text => ComponentValue::Text(read_text(cur)?),
        ComponentShape::TextList => ComponentValue::TextList(read_list(cur, read_text)?),
        ComponentShape::Enchantments => {
            let levels = read_list(cur, |cur| Ok((read_varint(cur)?, read_varint(cur)?)))?;
            ComponentValue::Enchantments {
                levels,
                show_in_tooltip: read_bool(cur)?,
            }
        }
        ComponentShape::DyedColor => ComponentValue::DyedColor {
            rgb: read_i32(cur)?,
            show_in_tooltip: read_bool(cur)?,
        },
        ComponentShape::Identifier => ComponentValue::Identifier(read_identifier(cur)?),
        ComponentShape::ItemList => {
            ComponentValue::Items(read_list(cur, |cur| read_structured_slot_at(cur, ctx, depth + 1))?)
        }
    };
    Ok(value)
}

fn write_component(buf: &mut BytesMut, value: &ComponentValue) -> CodecResult<()> {
    match value {
        ComponentValue::Empty => {}
        ComponentValue::VarInt(v) => write_varint(buf, *v),
        ComponentValue::Int(v) => buf.put_i32(*v),
        ComponentValue::Bool(v) => write_bool(buf, *v),
        ComponentValue::Nbt(nbt) | ComponentValue::Text(nbt) => nbt.write_root_network(buf)?,
        ComponentValue::TextList(lines) => {
            write_varint(buf, lines.len() as i32);
            for line in lines {
                line.write_root_network(buf)?;
            }
        }
        ComponentValue::Enchantments {
            levels,
            show_in_tooltip,
        } => {
            write_varint(buf, levels.len() as i32);
            for (id, level) in levels {
                write_varint(buf, *id);
                write_varint(buf, *level);
            }
            write_bool(buf, *show_in_tooltip);
        }
        ComponentValue::DyedColor {
            rgb,
            show_in_tooltip,
        } => {
            buf.put_i32(*rgb);
            write_bool(buf, *show_in_tooltip);
        }
        ComponentValue::Identifier(id) => write_identifier(buf, id),
        ComponentValue::Items(items) => {
            write_varint(buf, items.len() as i32);
            for item in items {
                write_structured_slot(buf, item)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use prospector_nbt::{nbt_compound, NbtError};

    #[test]
    fn test_legacy_absent_by_flag() {
        let data = [0x00];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(read_legacy_slot(&mut cur, RootMode::Named).unwrap(), None);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_legacy_absent_by_sentinel_id() {
        // present flag, then item id -1, then bytes that belong to the next field
        let data = [0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x42];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(read_legacy_slot(&mut cur, RootMode::Named).unwrap(), None);
        assert_eq!(cur.rest(), &[0x42]);
    }

    #[test]
    fn test_legacy_without_nbt() {
        let data = [0x01, 0x05, 0x40, 0x00];
        let mut cur = ByteCursor::new(&data);
        let item = read_legacy_slot(&mut cur, RootMode::Named).unwrap().unwrap();
        assert_eq!(item, ItemStack::new(5, 64, ItemData::Legacy(None)));
    }

    #[test]
    fn test_legacy_roundtrip_with_nbt() {
        let item = Some(ItemStack::new(
            812,
            1,
            ItemData::Legacy(Some(nbt_compound! { "Damage" => NbtValue::Int(3) })),
        ));
        for mode in [RootMode::Named, RootMode::Anonymous] {
            let mut buf = BytesMut::new();
            write_legacy_slot(&mut buf, &item, mode).unwrap();
            let mut cur = ByteCursor::new(&buf);
            assert_eq!(read_legacy_slot(&mut cur, mode).unwrap(), item);
            assert!(cur.is_empty());
        }
    }

    #[test]
    fn test_legacy_bad_nbt_names_field() {
        let data = [0x01, 0x05, 0x01, 0x0A, 0x00];
        let mut cur = ByteCursor::new(&data);
        let err = read_legacy_slot(&mut cur, RootMode::Named).unwrap_err();
        assert_eq!(err.field_name(), Some("slot nbt"));
        assert!(matches!(
            err.root_cause(),
            CodecError::Nbt(NbtError::Truncated { .. })
        ));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_structured_empty_short_circuits() {
        let data = [0x00, 0x99];
        let mut cur = ByteCursor::new(&data);
        let tables = Tables::new();
        let ctx = tables.modern();
        assert_eq!(read_structured_slot(&mut cur, &ctx).unwrap(), None);
        assert_eq!(cur.rest(), &[0x99]);

        // negative counts are empty too
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(read_structured_slot(&mut cur, &ctx).unwrap(), None);
    }

    #[test]
    fn test_structured_components() {
        // count 2, item 7, one added (damage=5), one removed (id 4)
        let data = [0x02, 0x07, 0x01, 0x01, COMPONENT_DAMAGE as u8, 0x05, 0x04];
        let mut cur = ByteCursor::new(&data);
        let tables = Tables::new();
        let item = read_structured_slot(&mut cur, &tables.modern()).unwrap().unwrap();
        assert_eq!(item.count, 2);
        assert_eq!(item.item_id, 7);
        assert_eq!(item.component(COMPONENT_DAMAGE), Some(&ComponentValue::VarInt(5)));
        match &item.data {
            ItemData::Components(patch) => assert_eq!(patch.removed, vec![4]),
            other => panic!("unexpected data {:?}", other),
        }
        assert!(cur.is_empty());
    }

    #[test]
    fn test_structured_unknown_component_rolls_back() {
        let data = [0x01, 0x07, 0x01, 0x00, 0x7F, 0x00];
        let mut cur = ByteCursor::new(&data);
        let tables = Tables::new();
        let err = read_structured_slot(&mut cur, &tables.modern()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnknownTypeId {
                kind: "item component",
                id: 0x7F
            }
        ));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_structured_roundtrip_nested() {
        let inner = Some(ItemStack::new(
            3,
            16,
            ItemData::Components(ComponentPatch::default()),
        ));
        let item = Some(ItemStack::new(
            1,
            1,
            ItemData::Components(ComponentPatch {
                added: vec![
                    (COMPONENT_CUSTOM_NAME, ComponentValue::Text(NbtValue::String("Sword".into()))),
                    (
                        COMPONENT_ENCHANTMENTS,
                        ComponentValue::Enchantments {
                            levels: vec![(9, 5)],
                            show_in_tooltip: true,
                        },
                    ),
                    (COMPONENT_BUNDLE, ComponentValue::Items(vec![inner])),
                    (COMPONENT_GLINT, ComponentValue::Bool(false)),
                    (COMPONENT_HIDE_TOOLTIP, ComponentValue::Empty),
                ],
                removed: vec![],
            }),
        ));
        let tables = Tables::new();
        let ctx = tables.modern();
        let mut buf = BytesMut::new();
        write_slot(&mut buf, &item, &ctx).unwrap();
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(read_slot(&mut cur, &ctx).unwrap(), item);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_layouts_are_not_mixed() {
        let tables = Tables::new();
        let legacy_item = Some(ItemStack::new(
            1,
            1,
            ItemData::Legacy(Some(nbt_compound! {})),
        ));
        let mut buf = BytesMut::new();
        assert!(matches!(
            write_slot(&mut buf, &legacy_item, &tables.modern()),
            Err(CodecError::Unencodable(_))
        ));

        let component_item = Some(ItemStack::new(
            1,
            1,
            ItemData::Components(ComponentPatch::default()),
        ));
        assert!(matches!(
            write_slot(&mut buf, &component_item, &tables.legacy()),
            Err(CodecError::Unencodable(_))
        ));
    }

    #[test]
    fn test_nested_bundles_are_bounded() {
        // each level: count 1, item 1, one added bundle component holding one item
        let mut data = Vec::new();
        for _ in 0..=MAX_ITEM_NESTING + 1 {
            data.extend_from_slice(&[0x01, 0x01, 0x01, 0x00, COMPONENT_BUNDLE as u8, 0x01]);
        }
        data.push(0x00);
        let tables = Tables::new();
        let mut cur = ByteCursor::new(&data);
        let err = read_structured_slot(&mut cur, &tables.modern()).unwrap_err();
        assert!(matches!(err.root_cause(), CodecError::TooDeep(MAX_ITEM_NESTING)));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_legacy_count_must_fit_a_byte() {
        for count in [256, -1] {
            let mut buf = BytesMut::new();
            let slot = Some(ItemStack::new(1, count, ItemData::Legacy(None)));
            assert!(matches!(
                write_legacy_slot(&mut buf, &slot, RootMode::Named),
                Err(CodecError::Unencodable("slot count"))
            ));
            assert!(buf.is_empty());
        }
    }
}
