//! Wire bodies for `MessageKind::Status` replies (spec §4.I). A status
//! reply always starts with the `i32` code (§7's closed set); the three
//! version-mismatch errors append extra context the client needs to
//! retry, everything else carries an empty body.

use csp_core::{primitive, ByteSink, ByteSource, CommonFlags, CspResult, Status};

/// The extra payload attached to specific error replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBody {
    None,
    /// Spec §4.I: `u8 count` followed by `count * u8` supported protocol
    /// versions, one byte each (the only protocol version this port ever
    /// advertises is `1`, so a byte per version never truncates).
    NotSupportedProtocolVersion {
        supported_versions: Vec<u8>,
    },
    NotSupportedInterfaceVersion {
        min_supported: u32,
        max_supported: u32,
    },
    NotSupportedInOutInterfaceVersion {
        min_supported_input: u32,
        max_supported_input: u32,
        min_supported_output: u32,
        max_supported_output: u32,
    },
}

/// Write a full status reply: the common header was already written by
/// the caller (the reply's protocol version may legitimately be
/// `PROTOCOL_VERSION_UNDEFINED` when the request's own version was
/// unrecognized — spec §4.I's "undefined protocol version" case); this
/// writes only the status code and its body.
pub fn write_status(
    status: Status,
    body: StatusBody,
    common_flags: CommonFlags,
    sink: &mut dyn ByteSink,
) -> CspResult<()> {
    primitive::write_i32(status.as_i32(), common_flags, sink)?;
    match body {
        StatusBody::None => Ok(()),
        StatusBody::NotSupportedProtocolVersion { supported_versions } => {
            primitive::write_u8(supported_versions.len() as u8, common_flags, sink)?;
            for version in &supported_versions {
                primitive::write_u8(*version, common_flags, sink)?;
            }
            Ok(())
        }
        StatusBody::NotSupportedInterfaceVersion {
            min_supported,
            max_supported,
        } => {
            primitive::write_u32(min_supported, common_flags, sink)?;
            primitive::write_u32(max_supported, common_flags, sink)
        }
        StatusBody::NotSupportedInOutInterfaceVersion {
            min_supported_input,
            max_supported_input,
            min_supported_output,
            max_supported_output,
        } => {
            primitive::write_u32(min_supported_input, common_flags, sink)?;
            primitive::write_u32(max_supported_input, common_flags, sink)?;
            primitive::write_u32(min_supported_output, common_flags, sink)?;
            primitive::write_u32(max_supported_output, common_flags, sink)
        }
    }
}

/// Read a status code back off the wire. The caller already knows from
/// context (the request it sent) whether a body is expected and of which
/// shape, so the three typed readers below are separate rather than
/// inferred from the code.
pub fn read_status_code(common_flags: CommonFlags, source: &mut dyn ByteSource) -> CspResult<i32> {
    primitive::read_i32(common_flags, source)
}

pub fn read_protocol_version_body(
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<Vec<u8>> {
    let count = primitive::read_u8(common_flags, source)?;
    (0..count).map(|_| primitive::read_u8(common_flags, source)).collect()
}

pub fn read_interface_version_body(
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<(u32, u32)> {
    let min = primitive::read_u32(common_flags, source)?;
    let max = primitive::read_u32(common_flags, source)?;
    Ok((min, max))
}

pub fn read_in_out_interface_version_body(
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<(u32, u32, u32, u32)> {
    let min_in = primitive::read_u32(common_flags, source)?;
    let max_in = primitive::read_u32(common_flags, source)?;
    let min_out = primitive::read_u32(common_flags, source)?;
    let max_out = primitive::read_u32(common_flags, source)?;
    Ok((min_in, max_in, min_out, max_out))
}
