//! Memory-layout categories (spec §4.F) and the predicate that decides
//! whether a struct may skip field-by-field processing for a single bulk
//! copy.
//!
//! `AlwaysSimplyAssignable` and friends mirror the "SimplyAssignableTags"
//! hierarchy from `original_source/csp_base` one-for-one; the actual bulk
//! copy is done with `zerocopy::AsBytes`/`FromBytes`, the same crate the
//! teacher workspace already uses for its own `#[repr(C, packed)]` wire
//! structs (`summit-core/src/wire.rs`).

use zerocopy::{AsBytes, FromBytes};

use csp_core::{ByteSink, ByteSource, CspResult, DataFlags, Status};

/// How a struct's in-memory representation relates to its wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCategory {
    /// POD, no padding, native integer widths on both ends: eligible for a
    /// bulk copy under every negotiated `DataFlags` combination.
    AlwaysSimplyAssignable,
    /// POD with integer fields whose width may still need widening or
    /// narrowing, but whose alignment is guaranteed to match.
    SimplyAssignableFixedSize,
    /// POD whose alignment may legitimately differ between peers but whose
    /// integer widths are fixed.
    SimplyAssignableAlignedToOne,
    /// POD, but sensitive to both alignment and integer-width elasticity.
    SimplyAssignable,
    /// Must always be walked field by field (nested containers, pointers,
    /// or a struct with its own legacy version chain).
    FieldByField,
    /// Carries no fields; the wire form is zero bytes.
    EmptyType,
}

/// True when `layout`, combined with the negotiated `data_flags`, allows a
/// single bulk byte copy in place of field-by-field processing. Mirrors
/// `ContextProcessor`'s "is struct simply assignable" branch.
pub fn fast_path_eligible(layout: LayoutCategory, data_flags: DataFlags) -> bool {
    if data_flags.simply_assignable_tags_optimizations_are_turned_off() {
        return false;
    }
    match layout {
        LayoutCategory::AlwaysSimplyAssignable => true,
        LayoutCategory::SimplyAssignableFixedSize => !data_flags.alignment_may_be_not_equal(),
        LayoutCategory::SimplyAssignableAlignedToOne => {
            !data_flags.size_of_integers_may_be_not_equal()
        }
        LayoutCategory::SimplyAssignable => {
            !data_flags.alignment_may_be_not_equal()
                && !data_flags.size_of_integers_may_be_not_equal()
        }
        LayoutCategory::FieldByField | LayoutCategory::EmptyType => false,
    }
}

/// The bulk copy a `memcpy_serialize` override reaches for once
/// `fast_path_eligible` has already said yes: the struct's own bytes,
/// verbatim. Requires `zerocopy::AsBytes` the same way the teacher's
/// `#[repr(C, packed)]` wire structs do.
pub fn memcpy_serialize_bytes<T: AsBytes>(value: &T, sink: &mut dyn ByteSink) -> CspResult<()> {
    sink.append(value.as_bytes())
}

/// Mirror of `memcpy_serialize_bytes` for the read side; `T::read_from`
/// fails only if the source didn't have `size_of::<T>()` bytes left, which
/// `Status::DataCorrupted` already covers for every other malformed-body
/// case.
pub fn memcpy_deserialize_bytes<T: FromBytes>(source: &mut dyn ByteSource) -> CspResult<T> {
    let mut buf = vec![0u8; std::mem::size_of::<T>()];
    source.read(&mut buf)?;
    T::read_from(buf.as_slice()).ok_or(Status::DataCorrupted)
}
