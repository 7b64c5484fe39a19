//! Field-by-field helpers for the standard container shapes named in
//! spec §4.F: length-prefixed sequences, optional values, and key/value
//! pairs. Each nested element is itself run through `process::serialize_value`
//! / `deserialize_value`, so elements that are themselves `Serializable`
//! structs get their own legacy-conversion prelude for free.

use csp_core::{primitive, CspResult};

use crate::context::{DeserializeContext, SerializeContext};
use crate::process::{deserialize_value, serialize_value};
use crate::serializable::Serializable;

/// `Vec<T>` on the wire: a `size_t` length prefix followed by each element
/// in order.
pub fn serialize_vec<T: Serializable>(values: &[T], ctx: &mut SerializeContext) -> CspResult<()> {
    primitive::write_size_t(values.len(), ctx.common_flags(), ctx.sink_mut())?;
    for value in values {
        serialize_value(value, ctx)?;
    }
    Ok(())
}

pub fn deserialize_vec<T: Serializable>(ctx: &mut DeserializeContext) -> CspResult<Vec<T>> {
    let len = primitive::read_size_t(ctx.common_flags(), ctx.source_mut())?;
    let mut values = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        values.push(deserialize_value::<T>(ctx)?);
    }
    Ok(values)
}

/// `Option<T>` on the wire: a presence byte, then the value if present.
pub fn serialize_option<T: Serializable>(
    value: &Option<T>,
    ctx: &mut SerializeContext,
) -> CspResult<()> {
    match value {
        None => primitive::write_bool(false, ctx.sink_mut()),
        Some(inner) => {
            primitive::write_bool(true, ctx.sink_mut())?;
            serialize_value(inner, ctx)
        }
    }
}

pub fn deserialize_option<T: Serializable>(
    ctx: &mut DeserializeContext,
) -> CspResult<Option<T>> {
    if primitive::read_bool(ctx.source_mut())? {
        Ok(Some(deserialize_value::<T>(ctx)?))
    } else {
        Ok(None)
    }
}

/// A key/value pair, written as `key` then `value` with no framing of its
/// own (the original's `std::pair` support).
pub fn serialize_pair<K: Serializable, V: Serializable>(
    key: &K,
    value: &V,
    ctx: &mut SerializeContext,
) -> CspResult<()> {
    serialize_value(key, ctx)?;
    serialize_value(value, ctx)
}

pub fn deserialize_pair<K: Serializable, V: Serializable>(
    ctx: &mut DeserializeContext,
) -> CspResult<(K, V)> {
    let key = deserialize_value::<K>(ctx)?;
    let value = deserialize_value::<V>(ctx)?;
    Ok((key, value))
}

/// `HashMap`/`BTreeMap`-shaped containers: a `size_t` length prefix
/// followed by that many key/value pairs. Collected into whatever `C`
/// the caller needs via `FromIterator`.
pub fn serialize_map<'a, K, V, I>(entries: I, ctx: &mut SerializeContext) -> CspResult<()>
where
    K: Serializable + 'a,
    V: Serializable + 'a,
    I: ExactSizeIterator<Item = (&'a K, &'a V)>,
{
    primitive::write_size_t(entries.len(), ctx.common_flags(), ctx.sink_mut())?;
    for (key, value) in entries {
        serialize_pair(key, value, ctx)?;
    }
    Ok(())
}

pub fn deserialize_map<K, V, C>(ctx: &mut DeserializeContext) -> CspResult<C>
where
    K: Serializable,
    V: Serializable,
    C: FromIterator<(K, V)>,
{
    let len = primitive::read_size_t(ctx.common_flags(), ctx.source_mut())?;
    let mut entries = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        entries.push(deserialize_pair::<K, V>(ctx)?);
    }
    Ok(entries.into_iter().collect())
}
