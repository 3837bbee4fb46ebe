pub mod components;
pub mod flags;
pub mod metadata;
pub mod particles;

pub use components::*;
pub use flags::*;
pub use metadata::*;
pub use particles::*;

use prospector_protocol_core::{MetadataTypeTable, SpawnLayout, WireContext, WireFlags};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("protocol version {0} is not supported (need {min} or newer)", min = MIN_SUPPORTED)]
pub struct UnsupportedVersion(pub i32);

/// Everything the codec needs for one protocol version, resolved once.
#[derive(Clone, Copy)]
pub struct VersionTables {
    protocol: i32,
    flags: WireFlags,
    metadata: &'static dyn MetadataTypeTable,
    components: ComponentTable,
    particles: ParticleTable,
}

impl VersionTables {
    pub fn for_protocol(protocol: i32) -> Result<Self, UnsupportedVersion> {
        let metadata = metadata_table(protocol).ok_or(UnsupportedVersion(protocol))?;
        let (components, particles) = if protocol >= V1_20_5 {
            (COMPONENTS_1_20_5, PARTICLES_1_20_5)
        } else {
            // older palettes are not tabulated; particle data there is rejected
            (ComponentTable::EMPTY, ParticleTable::EMPTY)
        };
        if protocol > MAX_SUPPORTED {
            debug!(
                "Protocol {} is newer than {}, using the newest tables",
                protocol, MAX_SUPPORTED
            );
        }
        Ok(Self {
            protocol,
            flags: wire_flags(protocol),
            metadata,
            components,
            particles,
        })
    }

    pub fn protocol(&self) -> i32 {
        self.protocol
    }

    pub fn flags(&self) -> WireFlags {
        self.flags
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    pub fn particles(&self) -> &ParticleTable {
        &self.particles
    }

    /// The context passed to every composite decoder.
    pub fn context(&self) -> WireContext<'_> {
        WireContext {
            flags: self.flags,
            metadata: self.metadata,
            components: &self.components,
            particles: &self.particles,
        }
    }

    pub fn spawn_layout(&self, living: bool) -> SpawnLayout {
        SpawnLayout::select(self.flags.modern_entity_spawn, living)
    }
}

impl std::fmt::Debug for VersionTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionTables")
            .field("protocol", &self.protocol)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
