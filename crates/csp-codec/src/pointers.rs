//! Pointer-graph fields (spec §4.F, "pointers and cyclic graphs"). A
//! `csp` pointer field is modeled in Rust as `Option<Rc<RefCell<T>>>`; the
//! wire form is:
//!
//! - one presence byte;
//! - if present and `CheckRecursivePointers` is negotiated, a "new/backref"
//!   byte followed by a `u64` identity, then (new only) the pointee body;
//! - if present and recursion tracking is off, just the pointee body.
//!
//! On deserialize, every freshly materialized pointee is handed to the
//! context's pointer-keeper list, so it stays alive for the lifetime of
//! the surrounding message the way `original_source`'s
//! `PointersContextKeeper` keeps raw allocations alive for the call.

use std::cell::RefCell;
use std::rc::Rc;

use csp_core::{primitive, CspResult, PtrKeeper, Status};

use crate::context::{DeserializeContext, SerializeContext};
use crate::process::{deserialize_value, serialize_value};
use crate::serializable::Serializable;

pub fn serialize_pointer<T: Serializable + 'static>(
    value: &Option<Rc<RefCell<T>>>,
    ctx: &mut SerializeContext,
) -> CspResult<()> {
    let Some(rc) = value else {
        return primitive::write_bool(false, ctx.sink_mut());
    };
    primitive::write_bool(true, ctx.sink_mut())?;

    if !ctx.data_flags().check_recursive_pointers() {
        return serialize_value(&*rc.borrow(), ctx);
    }

    let identity = Rc::as_ptr(rc) as *const () as usize;
    let (id, already_seen) = ctx.pointer_id_for(identity);
    primitive::write_bool(!already_seen, ctx.sink_mut())?;
    primitive::write_u64(id, ctx.common_flags(), ctx.sink_mut())?;
    if already_seen {
        return Ok(());
    }
    serialize_value(&*rc.borrow(), ctx)
}

/// `T: Default` is required so a cyclic reference to a pointee can be
/// resolved to a real `Rc` identity *before* that pointee's own fields
/// (which may point straight back at it) have been read: a placeholder is
/// registered first and its contents replaced once the body finishes.
pub fn deserialize_pointer<T: Serializable + Default + 'static>(
    ctx: &mut DeserializeContext,
) -> CspResult<Option<Rc<RefCell<T>>>> {
    if !primitive::read_bool(ctx.source_mut())? {
        return Ok(None);
    }

    if !ctx.data_flags().check_recursive_pointers() {
        let value = deserialize_value::<T>(ctx)?;
        let rc = Rc::new(RefCell::new(value));
        ctx.adopt_keeper(PtrKeeper::new(rc.clone()));
        return Ok(Some(rc));
    }

    let is_new = primitive::read_bool(ctx.source_mut())?;
    let id = primitive::read_u64(ctx.common_flags(), ctx.source_mut())?;

    if !is_new {
        return match ctx.recall_pointer::<Rc<RefCell<T>>>(id) {
            Some(rc) => Ok(Some(rc.clone())),
            None => Err(Status::DataCorrupted),
        };
    }

    let placeholder = Rc::new(RefCell::new(T::default()));
    ctx.remember_pointer(id, placeholder.clone());
    let value = deserialize_value::<T>(ctx)?;
    *placeholder.borrow_mut() = value;
    ctx.adopt_keeper(PtrKeeper::new(placeholder.clone()));
    Ok(Some(placeholder))
}
