//! Party settings and the compatibility negotiation between a client's
//! declared settings and a server's (spec §4.J, `GetSettings` response
//! path). Grounded on `summit-core::config::SummitConfig`'s shape (a
//! handful of named fields resolved once at startup) but built
//! programmatically here — CSP has no persisted/env configuration surface
//! of its own (see DESIGN.md).

use std::collections::HashMap;

use csp_core::{primitive, ByteSink, ByteSource, CspResult, DataFlags, Id, Interface, Status};
use csp_codec::layout::LayoutCategory;
use csp_codec::{DeserializeContext, Serializable, SerializeContext};

/// One party's (client or server) advertised capabilities.
#[derive(Debug, Clone)]
pub struct PartySettings {
    pub min_protocol_version: u16,
    pub max_protocol_version: u16,
    pub mandatory_common_flags: csp_core::CommonFlags,
    pub forbidden_common_flags: csp_core::CommonFlags,
    pub mandatory_data_flags: DataFlags,
    pub forbidden_data_flags: DataFlags,
    /// Minimum interface version this party will accept, per interface id.
    /// An interface absent from the map has no floor beyond the
    /// interface's own declared minimum.
    pub interface_version_floors: HashMap<Id, u32>,
}

impl PartySettings {
    pub fn new(min_protocol_version: u16, max_protocol_version: u16) -> Self {
        Self {
            min_protocol_version,
            max_protocol_version,
            mandatory_common_flags: csp_core::CommonFlags::new(0),
            forbidden_common_flags: csp_core::CommonFlags::new(0),
            mandatory_data_flags: DataFlags::new(0),
            forbidden_data_flags: DataFlags::new(0),
            interface_version_floors: HashMap::new(),
        }
    }

    pub fn with_mandatory_data_flags(mut self, flags: DataFlags) -> Self {
        self.mandatory_data_flags = flags;
        self
    }

    pub fn with_forbidden_data_flags(mut self, flags: DataFlags) -> Self {
        self.forbidden_data_flags = flags;
        self
    }

    pub fn with_interface_floor(mut self, interface: Id, version: u32) -> Self {
        self.interface_version_floors.insert(interface, version);
        self
    }

    /// The "sorted descending list of supported protocol versions" spec §3
    /// describes, derived from the `[min, max]` range this party
    /// advertises. Each entry is narrowed to `u8` for the §4.I status
    /// body, which never needs more than that (protocol version `1` is
    /// the only value spec §6 defines).
    pub fn supported_protocol_versions(&self) -> Vec<u8> {
        (self.min_protocol_version..=self.max_protocol_version)
            .rev()
            .map(|version| version as u8)
            .collect()
    }

    /// §4.L step 4: a `Data` request's own common flags must satisfy this
    /// party's mandatory/forbidden common-flags masks, the same
    /// compatibility test data flags already get in
    /// `data_context::test_data_flags_compatibility`.
    pub fn validate_common_flags(&self, flags: csp_core::CommonFlags) -> CspResult<()> {
        let bits = flags.bits();
        if bits & self.mandatory_common_flags.bits() != self.mandatory_common_flags.bits() {
            return Err(Status::NotCompatibleCommonFlagsSettings);
        }
        if bits & self.forbidden_common_flags.bits() != 0 {
            return Err(Status::NotCompatibleCommonFlagsSettings);
        }
        Ok(())
    }
}

/// The wire-visible form of `PartySettings` (spec §4.J) — what `GetSettings`
/// actually replies with: a Data-framed value of this struct, carrying the
/// fields spec §3 enumerates for party settings, including the
/// `(interfaceId, interfaceVersion)` list a flat field sequence can't
/// express. Custom body (rather than field-by-field derived through nested
/// `Serializable` wrappers) because `CommonFlags`/`DataFlags` are opaque
/// bags written as their raw `u32`, not recursed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspPartySettings {
    pub supported_protocol_versions: Vec<u16>,
    pub mandatory_common_flags: u32,
    pub forbidden_common_flags: u32,
    pub mandatory_data_flags: u32,
    pub forbidden_data_flags: u32,
    pub interfaces: Vec<(Id, u32)>,
}

impl From<&PartySettings> for CspPartySettings {
    fn from(settings: &PartySettings) -> Self {
        Self {
            supported_protocol_versions: (settings.min_protocol_version..=settings.max_protocol_version)
                .rev()
                .collect(),
            mandatory_common_flags: settings.mandatory_common_flags.bits(),
            forbidden_common_flags: settings.forbidden_common_flags.bits(),
            mandatory_data_flags: settings.mandatory_data_flags.bits(),
            forbidden_data_flags: settings.forbidden_data_flags.bits(),
            interfaces: settings
                .interface_version_floors
                .iter()
                .map(|(id, version)| (*id, *version))
                .collect(),
        }
    }
}

impl Serializable for CspPartySettings {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        Id::from_u128(900)
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(901), 1)
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        let flags = ctx.common_flags();
        primitive::write_size_t(self.supported_protocol_versions.len(), flags, ctx.sink_mut())?;
        for version in &self.supported_protocol_versions {
            primitive::write_u16(*version, flags, ctx.sink_mut())?;
        }
        primitive::write_u32(self.mandatory_common_flags, flags, ctx.sink_mut())?;
        primitive::write_u32(self.forbidden_common_flags, flags, ctx.sink_mut())?;
        primitive::write_u32(self.mandatory_data_flags, flags, ctx.sink_mut())?;
        primitive::write_u32(self.forbidden_data_flags, flags, ctx.sink_mut())?;
        primitive::write_size_t(self.interfaces.len(), flags, ctx.sink_mut())?;
        for (id, version) in &self.interfaces {
            ctx.sink_mut().append(&id.as_bytes())?;
            primitive::write_u32(*version, flags, ctx.sink_mut())?;
        }
        Ok(())
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        let flags = ctx.common_flags();
        let version_count = primitive::read_size_t(flags, ctx.source_mut())?;
        let mut supported_protocol_versions = Vec::with_capacity(version_count.min(4096));
        for _ in 0..version_count {
            supported_protocol_versions.push(primitive::read_u16(flags, ctx.source_mut())?);
        }
        let mandatory_common_flags = primitive::read_u32(flags, ctx.source_mut())?;
        let forbidden_common_flags = primitive::read_u32(flags, ctx.source_mut())?;
        let mandatory_data_flags = primitive::read_u32(flags, ctx.source_mut())?;
        let forbidden_data_flags = primitive::read_u32(flags, ctx.source_mut())?;
        let interface_count = primitive::read_size_t(flags, ctx.source_mut())?;
        let mut interfaces = Vec::with_capacity(interface_count.min(4096));
        for _ in 0..interface_count {
            let mut id_bytes = [0u8; 16];
            ctx.source_mut().read(&mut id_bytes)?;
            let version = primitive::read_u32(flags, ctx.source_mut())?;
            interfaces.push((Id::from_bytes(id_bytes), version));
        }
        Ok(Self {
            supported_protocol_versions,
            mandatory_common_flags,
            forbidden_common_flags,
            mandatory_data_flags,
            forbidden_data_flags,
            interfaces,
        })
    }
}

/// The outcome of negotiating a client's settings against a server's: the
/// intersected protocol version range, unioned flag requirements, and the
/// per-interface floor each side would actually enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleSettings {
    pub min_protocol_version: u16,
    pub max_protocol_version: u16,
    pub mandatory_common_flags: u32,
    pub forbidden_common_flags: u32,
    pub mandatory_data_flags: u32,
    pub forbidden_data_flags: u32,
}

/// Intersect two parties' settings (spec §4.J). Protocol version ranges
/// intersect; mandatory/forbidden flag sets union. An overlap between the
/// unioned mandatory and forbidden sets means the two parties have made
/// mutually exclusive demands and cannot interoperate at all.
pub fn compatible_settings(a: &PartySettings, b: &PartySettings) -> CspResult<CompatibleSettings> {
    let min_protocol_version = a.min_protocol_version.max(b.min_protocol_version);
    let max_protocol_version = a.max_protocol_version.min(b.max_protocol_version);
    if min_protocol_version > max_protocol_version {
        return Err(Status::NotSupportedProtocolVersion);
    }

    let mandatory_common_flags = a.mandatory_common_flags.bits() | b.mandatory_common_flags.bits();
    let forbidden_common_flags = a.forbidden_common_flags.bits() | b.forbidden_common_flags.bits();
    if mandatory_common_flags & forbidden_common_flags != 0 {
        return Err(Status::NotCompatibleCommonFlagsSettings);
    }

    let mandatory_data_flags = a.mandatory_data_flags.bits() | b.mandatory_data_flags.bits();
    let forbidden_data_flags = a.forbidden_data_flags.bits() | b.forbidden_data_flags.bits();
    if mandatory_data_flags & forbidden_data_flags != 0 {
        return Err(Status::NotCompatibleDataFlagsSettings);
    }

    Ok(CompatibleSettings {
        min_protocol_version,
        max_protocol_version,
        mandatory_common_flags,
        forbidden_common_flags,
        mandatory_data_flags,
        forbidden_data_flags,
    })
}

/// The floor the two parties would jointly enforce for one interface: the
/// higher of whatever each side individually demands.
pub fn compatible_interface_floor(a: &PartySettings, b: &PartySettings, interface: Id) -> u32 {
    let floor_a = a.interface_version_floors.get(&interface).copied().unwrap_or(0);
    let floor_b = b.interface_version_floors.get(&interface).copied().unwrap_or(0);
    floor_a.max(floor_b)
}
