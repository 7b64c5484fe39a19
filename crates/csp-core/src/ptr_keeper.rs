//! Pointer-keeper (spec §4.B) — a type-erased owner of a heap allocation
//! plus its destructor, used by the body processor (csp-codec) to hold
//! pointees materialized while parsing `AllowUnmanagedPointers` graphs.
//!
//! The original design stores a raw `void*`, an element count, and a
//! destroyer function pointer. Rust already has a safe type-erased owning
//! container with the same contract ("destroy-and-deallocate on drop"):
//! `Box<dyn Any + Send + Sync>`. Using it keeps the component's promise
//! (spec treats pointer-keepers as "scoped resource holders with a
//! destroy-and-deallocate function") without reintroducing manual unsafe
//! pointer bookkeeping.

use std::any::Any;

/// An owning, type-erased handle to one allocation (or one `Vec` of
/// elements, for array pointees). Move-only; dropping it runs the
/// contained value's destructor and frees its storage.
#[derive(Debug)]
pub struct PtrKeeper {
    inner: Option<Box<dyn Any + Send + Sync>>,
    count: usize,
}

impl PtrKeeper {
    /// Wrap a single heap-allocated value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Some(Box::new(value)),
            count: 1,
        }
    }

    /// Wrap a heap-allocated array of `count` elements.
    pub fn new_array<T: Any + Send + Sync>(values: Vec<T>) -> Self {
        let count = values.len();
        Self {
            inner: Some(Box::new(values)),
            count,
        }
    }

    /// The empty keeper — holds nothing, destroys nothing.
    pub fn empty() -> Self {
        Self {
            inner: None,
            count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref()?.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.inner.as_deref_mut()?.downcast_mut()
    }
}

impl Default for PtrKeeper {
    fn default() -> Self {
        Self::empty()
    }
}

/// The allocation seam spec §4.B's "scoped resource holder with a
/// destroy-and-deallocate function" describes: something that turns an
/// already-constructed value into the `PtrKeeper` that will own it.
/// `dyn`-safe by taking the value pre-boxed rather than as a generic
/// parameter, so callers that want a non-default allocation strategy
/// (arena, pool, leak-on-purpose for `'static` data) can supply one
/// without `csp-codec` needing to know about it.
pub trait Allocator {
    fn adopt(&self, value: Box<dyn Any + Send + Sync>) -> PtrKeeper;
}

/// Boxes onto the global Rust allocator — what every pointee uses unless a
/// caller opts into something else.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalAllocator;

impl Allocator for GlobalAllocator {
    fn adopt(&self, value: Box<dyn Any + Send + Sync>) -> PtrKeeper {
        PtrKeeper {
            inner: Some(value),
            count: 1,
        }
    }
}

impl PtrKeeper {
    /// Construct a keeper through an explicit `Allocator`, rather than
    /// always going through the global allocator via `PtrKeeper::new`.
    pub fn allocate_and_construct<T: Any + Send + Sync>(
        allocator: &dyn Allocator,
        value: T,
    ) -> PtrKeeper {
        allocator.adopt(Box::new(value))
    }
}
