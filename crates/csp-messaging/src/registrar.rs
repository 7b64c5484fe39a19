//! Handler registrar (spec §4.K / §5) — maps struct ids to one or more
//! registered handlers, concurrent under `dashmap` the way the teacher's
//! `ServiceDispatcher` maps schema ids to services, but with the
//! acquire/release reference counting spec §5 calls for: a dispatch in
//! flight holds a strong reference that blocks a concurrent
//! `unregister_all` from completing until it's dropped.
//!
//! Registration also carries the unicast/multicast distinction spec §4.K
//! draws: a non-multicast struct id accepts at most one handler, and
//! `acquire` enforces the `NoError` / `ErrorMoreEntires` /
//! `ErrorNoSuchHandler` trichotomy rather than always handing back
//! whatever is registered.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use csp_core::{CspResult, Id, Status};

use crate::handler::ServerDataHandler;

struct Registration {
    multicast: bool,
    handlers: Vec<Arc<dyn ServerDataHandler>>,
}

pub struct HandlerRegistrar {
    handlers: DashMap<Id, Registration>,
    in_flight: DashMap<Id, Arc<AtomicUsize>>,
}

impl HandlerRegistrar {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Register a handler for its own `struct_id()`. `multicast` declares
    /// whether more than one handler may share this struct id; a second
    /// registration is rejected with `Status::AlreadyInited` whenever
    /// either the new registration or the existing one says otherwise
    /// (spec §4.K: "for a non-multicast struct id, at most one handler may
    /// be attached").
    pub fn register(&self, handler: Arc<dyn ServerDataHandler>, multicast: bool) -> CspResult<()> {
        let id = handler.struct_id();
        match self.handlers.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(Registration {
                    multicast,
                    handlers: vec![handler],
                });
            }
            Entry::Occupied(mut entry) => {
                if !multicast || !entry.get().multicast {
                    return Err(Status::AlreadyInited);
                }
                entry.get_mut().handlers.push(handler);
            }
        }
        self.in_flight
            .entry(id)
            .or_insert_with(|| Arc::new(AtomicUsize::new(0)));
        Ok(())
    }

    /// Remove every handler registered for `struct_id`. Spin-waits for any
    /// dispatch already holding an `AcquiredHandlers` for this id to
    /// finish and drop it, so a handler is never dropped out from under a
    /// call in progress.
    pub fn unregister_all(&self, struct_id: Id) {
        self.handlers.remove(&struct_id);
        if let Some(counter) = self.in_flight.get(&struct_id) {
            let counter = counter.clone();
            while counter.load(Ordering::Acquire) != 0 {
                std::thread::yield_now();
            }
        }
    }

    /// Acquire the handler registered for `struct_id`, enforcing spec
    /// §4.K / §8 property 4's trichotomy: exactly one handler succeeds,
    /// zero is `Status::NoSuchHandler`, and more than one is
    /// `Status::MoreEntires` — the caller is then expected to fall back to
    /// [`Self::acquire_many`] for the multicast replay path.
    pub fn acquire(&self, struct_id: Id) -> CspResult<AcquiredHandlers> {
        let registration = self.handlers.get(&struct_id).ok_or(Status::NoSuchHandler)?;
        match registration.handlers.len() {
            0 => Err(Status::NoSuchHandler),
            1 => {
                let handlers = registration.handlers.clone();
                drop(registration);
                Ok(self.acquire_counted(struct_id, handlers))
            }
            _ => Err(Status::MoreEntires),
        }
    }

    /// Acquire every handler currently registered for `struct_id`,
    /// regardless of count. Used for multicast dispatch once
    /// [`Self::acquire`] has reported `Status::MoreEntires`.
    pub fn acquire_many(&self, struct_id: Id) -> CspResult<AcquiredHandlers> {
        let handlers = self
            .handlers
            .get(&struct_id)
            .map(|entry| entry.handlers.clone())
            .filter(|v| !v.is_empty())
            .ok_or(Status::NoSuchHandler)?;
        Ok(self.acquire_counted(struct_id, handlers))
    }

    fn acquire_counted(&self, struct_id: Id, handlers: Vec<Arc<dyn ServerDataHandler>>) -> AcquiredHandlers {
        let counter = self
            .in_flight
            .entry(struct_id)
            .or_insert_with(|| Arc::new(AtomicUsize::new(0)))
            .clone();
        counter.fetch_add(1, Ordering::AcqRel);
        AcquiredHandlers { handlers, counter }
    }
}

impl Default for HandlerRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard over every handler acquired for one struct id at the
/// moment of acquisition. Dropping it releases the in-flight count.
pub struct AcquiredHandlers {
    handlers: Vec<Arc<dyn ServerDataHandler>>,
    counter: Arc<AtomicUsize>,
}

impl AcquiredHandlers {
    pub fn handlers(&self) -> &[Arc<dyn ServerDataHandler>] {
        &self.handlers
    }
}

impl Drop for AcquiredHandlers {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
