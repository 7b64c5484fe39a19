//! Data-context processing (spec §4.D/G) — the struct-aware header
//! validation that sits between the common header and the body processor.
//!
//! Check ordering below is pinned to
//! `original_source/csp_base/include/common_serialization/csp_base/processing/data/ContextProcessor.h`:
//! struct id first, then interface-version range, then data-flags
//! compatibility, then the internal-consistency invariant between
//! `CheckRecursivePointers` and `AllowUnmanagedPointers`.

use csp_core::{CspResult, DataFlags, Id, RawDataHeader, Status};

use crate::context::{DeserializeContext, SerializeContext};
use crate::serializable::Serializable;

/// Write the per-payload header (struct id, interface version, data
/// flags) ahead of a struct's body. Equivalent to `ContextProcessor::serialize`.
pub fn write_header<T: Serializable>(ctx: &mut SerializeContext) -> CspResult<()> {
    let header = RawDataHeader {
        struct_id: T::struct_id(),
        interface_version: ctx.interface_version(),
        data_flags: ctx.data_flags().bits(),
    };
    header.serialize(ctx.sink_mut())
}

/// Read the per-payload header without yet knowing which struct type it
/// claims to be (`ContextProcessor::deserializeNoChecks`). The caller
/// matches the returned id and interface version against the registered
/// handler before calling `postprocess_rest`.
pub fn read_header_unchecked(
    source: &mut dyn csp_core::ByteSource,
) -> CspResult<RawDataHeader> {
    RawDataHeader::deserialize(source)
}

/// Step 1 of `ContextProcessor::deserializePostprocessRest`: the struct id
/// on the wire must equal the statically-known id of `T`.
pub fn postprocess_id<T: Serializable>(id: Id) -> CspResult<()> {
    if id == T::struct_id() {
        Ok(())
    } else {
        Err(Status::MismatchOfStructId)
    }
}

/// Steps 2-4 of `ContextProcessor::deserializePostprocessRest`: interface
/// version range, data-flags compatibility, and the
/// `CheckRecursivePointers ⇒ AllowUnmanagedPointers` invariant. Populates
/// `ctx.interface_versions_not_match` for the body processor / version
/// converter to consult.
pub fn postprocess_rest<T: Serializable>(
    ctx: &mut DeserializeContext,
    minimum_interface_version: u32,
) -> CspResult<()> {
    let floor = minimum_interface_version.max(T::min_supported_interface_version());
    if ctx.interface_version() < floor || ctx.interface_version() > T::latest_interface_version()
    {
        return Err(Status::NotSupportedInterfaceVersion);
    }
    ctx.set_interface_versions_not_match(ctx.interface_version() != T::latest_interface_version());

    test_data_flags_compatibility::<T>(ctx.data_flags())?;

    if !ctx.data_flags().is_internally_consistent() {
        return Err(Status::NotCompatibleDataFlagsSettings);
    }

    Ok(())
}

/// Re-validated on the write side too, and whenever a legacy-conversion
/// attempt returns `NotApplicable` (spec §4.F prelude, step 2).
pub fn test_data_flags_compatibility<T: Serializable>(data_flags: DataFlags) -> CspResult<()> {
    let mandatory = T::effective_mandatory_data_flags();
    let forbidden = T::effective_forbidden_data_flags();

    if (data_flags.bits() & mandatory.bits()) != mandatory.bits() {
        return Err(Status::NotCompatibleDataFlagsSettings);
    }
    if (data_flags.bits() & forbidden.bits()) != 0 {
        return Err(Status::NotCompatibleDataFlagsSettings);
    }
    Ok(())
}
