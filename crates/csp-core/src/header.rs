//! Message framing: the common header (always present) and the raw form of
//! the data-payload header (present only for `MessageKind::Data`).
//! Layout is fixed, little-endian, per spec §6.

use crate::flags::CommonFlags;
use crate::id::Id;
use crate::io::{ByteSink, ByteSource};
use crate::status::{CspResult, Status};

/// The only protocol version this implementation negotiates.
pub const PROTOCOL_VERSION_1: u16 = 1;
/// Reserved "unknown protocol" marker, used only in server replies when the
/// request's protocol version was not recognized.
pub const PROTOCOL_VERSION_UNDEFINED: u16 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageKind {
    Status = 0,
    Data = 1,
    CommonCapabilitiesRequest = 2,
    GetSettings = 3,
}

impl MessageKind {
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for MessageKind {
    type Error = Status;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageKind::Status),
            1 => Ok(MessageKind::Data),
            2 => Ok(MessageKind::CommonCapabilitiesRequest),
            3 => Ok(MessageKind::GetSettings),
            _ => Err(Status::DataCorrupted),
        }
    }
}

/// The header written at offset 0 of every message, regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    pub protocol_version: u16,
    pub message_kind: MessageKind,
    pub common_flags: CommonFlags,
}

impl CommonHeader {
    pub const WIRE_SIZE: usize = 2 + 4 + 4;

    /// Write the header verbatim — used both for ordinary requests and for
    /// replies whose common header has already been validated on receive
    /// (the "no-checks" variant from spec §4.C).
    pub fn serialize(&self, sink: &mut dyn ByteSink) -> CspResult<()> {
        sink.append(&self.protocol_version.to_le_bytes())?;
        sink.append(&self.message_kind.as_u32().to_le_bytes())?;
        sink.append(&self.common_flags.bits().to_le_bytes())?;
        Ok(())
    }

    /// Read and validate a header against the caller's supported protocol
    /// version range and the endianness-compatibility rule (spec §4.C).
    pub fn deserialize(
        source: &mut dyn ByteSource,
        min_supported_protocol_version: u16,
        latest_known_protocol_version: u16,
    ) -> CspResult<Self> {
        let mut buf2 = [0u8; 2];
        source.read(&mut buf2)?;
        let protocol_version = u16::from_le_bytes(buf2);

        if protocol_version < min_supported_protocol_version
            || protocol_version > latest_known_protocol_version
        {
            return Err(Status::NotSupportedProtocolVersion);
        }

        let mut buf4 = [0u8; 4];
        source.read(&mut buf4)?;
        let message_kind = MessageKind::try_from(u32::from_le_bytes(buf4))?;

        source.read(&mut buf4)?;
        let common_flags = CommonFlags::new(u32::from_le_bytes(buf4));

        if common_flags.endianness_not_match() && !common_flags.endianness_difference() {
            return Err(Status::NotCompatibleCommonFlagsSettings);
        }

        Ok(Self {
            protocol_version,
            message_kind,
            common_flags,
        })
    }
}

/// The raw, struct-agnostic form of the header that follows a `Data`
/// common header. Validating it against a concrete registered type is
/// `csp-codec`'s job (component G); this type only knows how to move the
/// three fields to and from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDataHeader {
    pub struct_id: Id,
    pub interface_version: u32,
    pub data_flags: u32,
}

impl RawDataHeader {
    pub const WIRE_SIZE: usize = 16 + 4 + 4;

    pub fn serialize(&self, sink: &mut dyn ByteSink) -> CspResult<()> {
        sink.append(&self.struct_id.as_bytes())?;
        sink.append(&self.interface_version.to_le_bytes())?;
        sink.append(&self.data_flags.to_le_bytes())?;
        Ok(())
    }

    pub fn deserialize(source: &mut dyn ByteSource) -> CspResult<Self> {
        let mut id_bytes = [0u8; 16];
        source.read(&mut id_bytes)?;

        let mut buf4 = [0u8; 4];
        source.read(&mut buf4)?;
        let interface_version = u32::from_le_bytes(buf4);

        source.read(&mut buf4)?;
        let data_flags = u32::from_le_bytes(buf4);

        Ok(Self {
            struct_id: Id::from_bytes(id_bytes),
            interface_version,
            data_flags,
        })
    }
}
