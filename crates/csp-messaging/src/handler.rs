//! Server-side data handler contract (spec §4.L), grounded on
//! `summit-services::ChunkService` — one trait object per registered
//! handler, dispatched on an id, called by the daemon's dispatcher.
//!
//! CSP handlers are typed (input struct in, output struct out) rather
//! than raw-byte, so the trait object boundary is pushed one level down:
//! `FnHandler<In, Out, F>` erases a concrete `Fn(In) -> CspResult<Out>`
//! into the single object-safe `ServerDataHandler` trait the registrar
//! stores.

use std::marker::PhantomData;

use csp_core::{CspResult, DataFlags, Id};
use csp_codec::{data_context, process, DeserializeContext, Serializable, SerializeContext};

/// Implemented once per registered (input, output) struct pair. Object-safe
/// so the registrar can hold `Arc<dyn ServerDataHandler>` regardless of the
/// concrete types involved.
pub trait ServerDataHandler: Send + Sync {
    fn struct_id(&self) -> Id;

    /// The oldest interface version this handler accepts. Distinct from
    /// `In::min_supported_interface_version()`: a handler may demand a
    /// newer floor than the struct itself still supports.
    fn minimum_interface_version(&self) -> u32;

    /// Policy gate run before deserializing the body (spec §4.L step 1):
    /// reject data flags this handler specifically refuses, independent of
    /// what the struct's own interface declares.
    fn check_policies_compliance(&self, _data_flags: DataFlags) -> CspResult<()> {
        Ok(())
    }

    /// Deserialize the input from `dctx`, run the handler, and serialize
    /// the output into `sctx`. `dctx`'s header has already been validated
    /// against `In` by the dispatcher (struct id, interface version range,
    /// data-flags compatibility) before this is called.
    fn handle_message(
        &self,
        dctx: &mut DeserializeContext,
        sctx: &mut SerializeContext,
    ) -> CspResult<()>;
}

/// Adapts a plain `Fn(In) -> CspResult<Out>` into a `ServerDataHandler`.
pub struct FnHandler<In, Out, F> {
    minimum_interface_version: u32,
    func: F,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> FnHandler<In, Out, F>
where
    In: Serializable,
    Out: Serializable,
    F: Fn(In) -> CspResult<Out> + Send + Sync,
{
    pub fn new(minimum_interface_version: u32, func: F) -> Self {
        Self {
            minimum_interface_version,
            func,
            _marker: PhantomData,
        }
    }
}

impl<In, Out, F> ServerDataHandler for FnHandler<In, Out, F>
where
    In: Serializable,
    Out: Serializable,
    F: Fn(In) -> CspResult<Out> + Send + Sync,
{
    fn struct_id(&self) -> Id {
        In::struct_id()
    }

    fn minimum_interface_version(&self) -> u32 {
        self.minimum_interface_version
    }

    fn handle_message(
        &self,
        dctx: &mut DeserializeContext,
        sctx: &mut SerializeContext,
    ) -> CspResult<()> {
        data_context::postprocess_rest::<In>(dctx, self.minimum_interface_version)?;
        let input = process::deserialize_value::<In>(dctx)?;
        let output = (self.func)(input)?;
        sctx.set_interface_versions_not_match(sctx.interface_version() != Out::latest_interface_version());
        process::serialize_message(&output, sctx)
    }
}
