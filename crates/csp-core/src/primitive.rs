//! Endianness-aware primitive read/write (spec §4.E).
//!
//! Three distinct wire disciplines live here:
//!  - fixed-width integers/enums/floats: raw bytes, byte-swapped when the
//!    frame's declared endianness disagrees with the local platform;
//!  - "platform-sized" integers under `SizeOfIntegersMayBeNotEqual`: a
//!    one-byte size prefix followed by narrowing/widening bytes;
//!  - `size_t` fields (container length prefixes): always written as a
//!    fixed `u64`, narrowed back to `usize` on read with an overflow check.

use crate::flags::{CommonFlags, DataFlags};
use crate::io::{ByteSink, ByteSource};
use crate::status::{CspResult, Status};

macro_rules! fixed_width_rw {
    ($write:ident, $read:ident, $ty:ty, $size:expr) => {
        pub fn $write(value: $ty, common_flags: CommonFlags, sink: &mut dyn ByteSink) -> CspResult<()> {
            let mut bytes = value.to_le_bytes();
            if common_flags.endianness_not_match() && $size > 1 {
                bytes.reverse();
            }
            sink.append(&bytes)
        }

        pub fn $read(common_flags: CommonFlags, source: &mut dyn ByteSource) -> CspResult<$ty> {
            let mut bytes = [0u8; $size];
            source.read(&mut bytes)?;
            if common_flags.endianness_not_match() && $size > 1 {
                bytes.reverse();
            }
            Ok(<$ty>::from_le_bytes(bytes))
        }
    };
}

fixed_width_rw!(write_u8, read_u8, u8, 1);
fixed_width_rw!(write_i8, read_i8, i8, 1);
fixed_width_rw!(write_u16, read_u16, u16, 2);
fixed_width_rw!(write_i16, read_i16, i16, 2);
fixed_width_rw!(write_u32, read_u32, u32, 4);
fixed_width_rw!(write_i32, read_i32, i32, 4);
fixed_width_rw!(write_u64, read_u64, u64, 8);
fixed_width_rw!(write_i64, read_i64, i64, 8);

pub fn write_f32(value: f32, common_flags: CommonFlags, sink: &mut dyn ByteSink) -> CspResult<()> {
    write_u32(value.to_bits(), common_flags, sink)
}

pub fn read_f32(common_flags: CommonFlags, source: &mut dyn ByteSource) -> CspResult<f32> {
    Ok(f32::from_bits(read_u32(common_flags, source)?))
}

pub fn write_f64(value: f64, common_flags: CommonFlags, sink: &mut dyn ByteSink) -> CspResult<()> {
    write_u64(value.to_bits(), common_flags, sink)
}

pub fn read_f64(common_flags: CommonFlags, source: &mut dyn ByteSource) -> CspResult<f64> {
    Ok(f64::from_bits(read_u64(common_flags, source)?))
}

pub fn write_bool(value: bool, sink: &mut dyn ByteSink) -> CspResult<()> {
    sink.append(&[value as u8])
}

pub fn read_bool(source: &mut dyn ByteSource) -> CspResult<bool> {
    let mut byte = [0u8];
    source.read(&mut byte)?;
    match byte[0] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Status::DataCorrupted),
    }
}

/// Accepted wire widths for elastic (platform-sized) integers.
fn is_valid_elastic_width(width: u8) -> bool {
    matches!(width, 1 | 2 | 4 | 8)
}

/// Write an unsigned "platform-sized" integer field. `local_width` is
/// `size_of::<T>()` for the field's local type (1, 2, 4, or 8).
pub fn write_elastic_unsigned(
    value: u64,
    local_width: u8,
    data_flags: DataFlags,
    common_flags: CommonFlags,
    sink: &mut dyn ByteSink,
) -> CspResult<()> {
    debug_assert!(is_valid_elastic_width(local_width));
    if data_flags.size_of_integers_may_be_not_equal() {
        write_u8(local_width, common_flags, sink)?;
    }
    write_narrow_unsigned(value, local_width, common_flags, sink)
}

/// Read an unsigned "platform-sized" integer field back into a `u64`; the
/// caller narrows further if its local type is smaller than 8 bytes.
pub fn read_elastic_unsigned(
    local_width: u8,
    data_flags: DataFlags,
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<u64> {
    debug_assert!(is_valid_elastic_width(local_width));
    let wire_width = if data_flags.size_of_integers_may_be_not_equal() {
        let width = read_u8(common_flags, source)?;
        if !is_valid_elastic_width(width) {
            return Err(Status::DataCorrupted);
        }
        width
    } else {
        local_width
    };

    let raw = read_narrow_unsigned(wire_width, common_flags, source)?;

    if wire_width <= local_width {
        Ok(raw)
    } else {
        // Wire value is wider than our local type: only acceptable if the
        // extra high bits are all zero.
        let local_max: u128 = (1u128 << (local_width as u32 * 8)) - 1;
        if (raw as u128) > local_max {
            Err(Status::ValueOverflow)
        } else {
            Ok(raw)
        }
    }
}

/// Write a signed "platform-sized" integer field.
pub fn write_elastic_signed(
    value: i64,
    local_width: u8,
    data_flags: DataFlags,
    common_flags: CommonFlags,
    sink: &mut dyn ByteSink,
) -> CspResult<()> {
    write_elastic_unsigned(value as u64, local_width, data_flags, common_flags, sink)
}

/// Read a signed "platform-sized" integer field, sign-extending if the wire
/// width is smaller than the local width and overflow-checking if larger.
pub fn read_elastic_signed(
    local_width: u8,
    data_flags: DataFlags,
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<i64> {
    debug_assert!(is_valid_elastic_width(local_width));
    let wire_width = if data_flags.size_of_integers_may_be_not_equal() {
        let width = read_u8(common_flags, source)?;
        if !is_valid_elastic_width(width) {
            return Err(Status::DataCorrupted);
        }
        width
    } else {
        local_width
    };

    let raw = read_narrow_unsigned(wire_width, common_flags, source)?;
    let sign_extended = sign_extend(raw, wire_width);

    if wire_width <= local_width {
        Ok(sign_extended)
    } else {
        // Narrowing: verify the value actually fits in local_width bytes,
        // signed.
        let min = i64::MIN >> (64 - local_width as u32 * 8).min(63);
        let max = if local_width >= 8 {
            i64::MAX
        } else {
            (1i64 << (local_width as u32 * 8 - 1)) - 1
        };
        let min = if local_width >= 8 { i64::MIN } else { min };
        if sign_extended < min || sign_extended > max {
            Err(Status::ValueOverflow)
        } else {
            Ok(sign_extended)
        }
    }
}

fn sign_extend(raw: u64, width: u8) -> i64 {
    let shift = 64 - width as u32 * 8;
    ((raw << shift) as i64) >> shift
}

fn write_narrow_unsigned(
    value: u64,
    width: u8,
    common_flags: CommonFlags,
    sink: &mut dyn ByteSink,
) -> CspResult<()> {
    match width {
        1 => write_u8(value as u8, common_flags, sink),
        2 => write_u16(value as u16, common_flags, sink),
        4 => write_u32(value as u32, common_flags, sink),
        8 => write_u64(value, common_flags, sink),
        _ => Err(Status::DataCorrupted),
    }
}

fn read_narrow_unsigned(
    width: u8,
    common_flags: CommonFlags,
    source: &mut dyn ByteSource,
) -> CspResult<u64> {
    match width {
        1 => read_u8(common_flags, source).map(|v| v as u64),
        2 => read_u16(common_flags, source).map(|v| v as u64),
        4 => read_u32(common_flags, source).map(|v| v as u64),
        8 => read_u64(common_flags, source),
        _ => Err(Status::DataCorrupted),
    }
}

/// `size_t` special serializer: always `u64` on the wire, narrowed back to
/// `usize` on read with an overflow check (spec §4.E).
pub fn write_size_t(value: usize, common_flags: CommonFlags, sink: &mut dyn ByteSink) -> CspResult<()> {
    write_u64(value as u64, common_flags, sink)
}

pub fn read_size_t(common_flags: CommonFlags, source: &mut dyn ByteSource) -> CspResult<usize> {
    let raw = read_u64(common_flags, source)?;
    usize::try_from(raw).map_err(|_| Status::ValueOverflow)
}
