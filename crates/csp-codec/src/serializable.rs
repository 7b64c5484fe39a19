//! The `Serializable` contract (spec §4.F/H) — what a generated-or-hand
//! written struct implementation must provide so `process::serialize_value`
//! / `process::deserialize_value` can drive it: identity, its owning
//! interface, its memory layout category, field-by-field bodies, an
//! optional bulk-copy fast path, and an optional legacy-version chain.

use csp_core::{CspResult, DataFlags, Id, Interface};

use crate::context::{DeserializeContext, SerializeContext};
use crate::layout::LayoutCategory;

/// Outcome of a legacy-version conversion attempt (spec §4.H). Distinct
/// from `Status` because `NoFurtherProcessingRequired` is never an error a
/// caller needs to propagate — it just tells `process::serialize_value` /
/// `deserialize_value` that a legacy representation already did the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The struct has no legacy chain, or the target version is already
    /// its latest: caller should proceed with the normal fast-path /
    /// field-by-field processing.
    NotApplicable,
    /// A legacy representation was found and fully serialized; nothing
    /// further to do for this struct occurrence.
    Done,
}

pub trait Serializable: Sized {
    const LAYOUT: LayoutCategory;

    fn struct_id() -> Id;
    fn interface() -> Interface;

    /// The newest interface version this struct's current Rust type
    /// represents.
    fn latest_interface_version() -> u32 {
        Self::interface().version
    }

    /// The oldest interface version this struct (directly, or via its
    /// legacy chain) can still produce/consume. Structs with no history
    /// override neither this nor the two `try_*_legacy` hooks below.
    fn min_supported_interface_version() -> u32 {
        Self::latest_interface_version()
    }

    fn effective_mandatory_data_flags() -> DataFlags {
        Self::interface().mandatory_data_flags
    }

    fn effective_forbidden_data_flags() -> DataFlags {
        Self::interface().forbidden_data_flags
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()>;
    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self>;

    /// Bulk-copy fast path. Only called when `Self::LAYOUT` is one of the
    /// simply-assignable categories and the negotiated `DataFlags` permit
    /// it (see `layout::fast_path_eligible`); field-by-field types never
    /// override this and it is never invoked for them.
    fn memcpy_serialize(&self, _ctx: &mut SerializeContext) -> CspResult<()> {
        unreachable!("memcpy_serialize called on a field-by-field type")
    }

    fn memcpy_deserialize(_ctx: &mut DeserializeContext) -> CspResult<Self> {
        unreachable!("memcpy_deserialize called on a field-by-field type")
    }

    /// If this struct's wire representation has moved on since
    /// `ctx.interface_version()`, serialize the matching legacy
    /// representation instead and report `Done`. Structs with no version
    /// history keep the default, which always reports `NotApplicable`.
    fn try_serialize_legacy(&self, _ctx: &mut SerializeContext) -> CspResult<ConvertOutcome> {
        Ok(ConvertOutcome::NotApplicable)
    }

    /// Mirror of `try_serialize_legacy` for the read side: `Some(value)`
    /// when a legacy representation was read and upgraded into `Self`.
    fn try_deserialize_legacy(_ctx: &mut DeserializeContext) -> CspResult<Option<Self>> {
        Ok(None)
    }
}
