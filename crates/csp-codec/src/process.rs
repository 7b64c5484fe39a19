//! Top-level per-struct processing (spec §4.F): the `CSP_SERIALIZE_COMMON`
//! / `CSP_DESERIALIZE_COMMON` prelude (legacy-version delegation, then
//! data-flags re-validation), followed by the bulk-copy fast path or a
//! field-by-field walk. Called once per message (right after the header)
//! and recursively for every nested `Serializable` field, including
//! pointees.

use csp_core::CspResult;

use crate::context::{DeserializeContext, SerializeContext};
use crate::data_context::{self, postprocess_id, postprocess_rest, read_header_unchecked, write_header};
use crate::layout::{fast_path_eligible, LayoutCategory};
use crate::serializable::{ConvertOutcome, Serializable};

/// Process a single struct occurrence: the version-converter prelude,
/// then either the bulk-copy fast path or `serialize_body`. Safe to call
/// both at the top of a message (after `write_header`) and recursively
/// for nested fields.
pub fn serialize_value<T: Serializable>(value: &T, ctx: &mut SerializeContext) -> CspResult<()> {
    if ctx.interface_versions_not_match() {
        if let ConvertOutcome::Done = value.try_serialize_legacy(ctx)? {
            return Ok(());
        }
    }

    data_context::test_data_flags_compatibility::<T>(ctx.data_flags())?;

    match T::LAYOUT {
        LayoutCategory::EmptyType => Ok(()),
        layout if fast_path_eligible(layout, ctx.data_flags()) => value.memcpy_serialize(ctx),
        _ => value.serialize_body(ctx),
    }
}

/// Mirror of `serialize_value` for the read side.
pub fn deserialize_value<T: Serializable>(ctx: &mut DeserializeContext) -> CspResult<T> {
    if ctx.interface_versions_not_match() {
        if let Some(value) = T::try_deserialize_legacy(ctx)? {
            return Ok(value);
        }
    }

    data_context::test_data_flags_compatibility::<T>(ctx.data_flags())?;

    match T::LAYOUT {
        LayoutCategory::EmptyType => T::deserialize_body(ctx),
        layout if fast_path_eligible(layout, ctx.data_flags()) => T::memcpy_deserialize(ctx),
        _ => T::deserialize_body(ctx),
    }
}

/// Full outbound path for a top-level message struct: header, then body.
pub fn serialize_message<T: Serializable>(value: &T, ctx: &mut SerializeContext) -> CspResult<()> {
    write_header::<T>(ctx)?;
    serialize_value(value, ctx)
}

/// Full inbound path for a top-level message struct: read and validate
/// the header, then the body. `minimum_interface_version` comes from the
/// handler registered for this struct (spec §4.L).
pub fn deserialize_message<T: Serializable>(
    ctx: &mut DeserializeContext,
    minimum_interface_version: u32,
) -> CspResult<T> {
    let raw = read_header_unchecked(ctx.source_mut())?;
    postprocess_id::<T>(raw.struct_id)?;
    ctx.set_interface_version(raw.interface_version);
    ctx.set_data_flags(csp_core::DataFlags::new(raw.data_flags));
    postprocess_rest::<T>(ctx, minimum_interface_version)?;
    deserialize_value(ctx)
}
