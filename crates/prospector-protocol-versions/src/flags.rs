use prospector_nbt::RootMode;
use prospector_protocol_core::{ParticleFlags, SlotLayout, WireFlags};
use prospector_types::PositionLayout;

// Protocol numbers where a wire layout changed.
pub const V1_14: i32 = 477;
pub const V1_17: i32 = 755;
pub const V1_18_2: i32 = 758;
pub const V1_19: i32 = 759;
pub const V1_19_2: i32 = 760;
pub const V1_19_3: i32 = 761;
pub const V1_19_4: i32 = 762;
pub const V1_20_2: i32 = 764;
pub const V1_20_3: i32 = 765;
pub const V1_20_5: i32 = 766;
pub const V1_21: i32 = 767;
pub const V1_21_2: i32 = 768;

/// Oldest protocol with a metadata table.
pub const MIN_SUPPORTED: i32 = V1_14;
/// Newest protocol with full tables.
pub const MAX_SUPPORTED: i32 = V1_21;

/// Resolve every layout switch for a protocol version.
pub fn wire_flags(protocol: i32) -> WireFlags {
    WireFlags {
        nbt_root: if protocol >= V1_20_2 {
            RootMode::Anonymous
        } else {
            RootMode::Named
        },
        slot_layout: if protocol >= V1_20_5 {
            SlotLayout::Structured
        } else {
            SlotLayout::Legacy
        },
        position_layout: if protocol >= V1_14 {
            PositionLayout::Modern
        } else {
            PositionLayout::Legacy
        },
        chat_as_nbt: protocol >= V1_20_3,
        modern_entity_spawn: protocol >= V1_19,
        particle: ParticleFlags {
            packed_color: protocol >= V1_21_2,
            has_origin: (V1_17..=V1_18_2).contains(&protocol),
            has_eye_height: protocol >= V1_19,
            vibration_source_by_id: protocol >= V1_20_5,
        },
    }
}

/// Human-readable release name for a protocol number, if known.
pub fn release_name(protocol: i32) -> Option<&'static str> {
    Some(match protocol {
        477 => "1.14",
        498 => "1.14.4",
        573 => "1.15",
        578 => "1.15.2",
        735 => "1.16",
        751 => "1.16.2",
        754 => "1.16.5",
        755 => "1.17",
        756 => "1.17.1",
        757 => "1.18",
        758 => "1.18.2",
        759 => "1.19",
        760 => "1.19.2",
        761 => "1.19.3",
        762 => "1.19.4",
        763 => "1.20.1",
        764 => "1.20.2",
        765 => "1.20.4",
        766 => "1.20.6",
        767 => "1.21.1",
        768 => "1.21.3",
        _ => return None,
    })
}
