//! csp-messaging — the server-facing layer built on `csp-codec`: status
//! replies, settings negotiation, the concurrent handler registrar, and
//! the dispatch loop that ties a request's bytes to a registered
//! handler's reply.

pub mod dispatcher;
pub mod handler;
pub mod logging;
pub mod registrar;
pub mod settings;
pub mod status_codec;

pub use dispatcher::ServerDispatcher;
pub use handler::{FnHandler, ServerDataHandler};
pub use logging::init_tracing;
pub use registrar::{AcquiredHandlers, HandlerRegistrar};
pub use settings::{
    compatible_interface_floor, compatible_settings, CompatibleSettings, CspPartySettings, PartySettings,
};
