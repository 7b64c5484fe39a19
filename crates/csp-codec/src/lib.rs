//! csp-codec — the recursive body processor, version converter, and
//! data-context validation that sit on top of `csp-core`'s wire
//! primitives. `csp-messaging` drives this crate per message; nothing
//! here knows about transports, handlers, or the server dispatch loop.

pub mod containers;
pub mod context;
pub mod data_context;
pub mod layout;
pub mod pointers;
pub mod process;
pub mod serializable;

pub use context::{DeserializeContext, SerializeContext};
pub use layout::LayoutCategory;
pub use process::{deserialize_message, deserialize_value, serialize_message, serialize_value};
pub use serializable::{ConvertOutcome, Serializable};
