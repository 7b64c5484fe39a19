//! Serialize/deserialize contexts (spec §4.D) — the per-call state the
//! body processor and version converter thread through a single message:
//! negotiated flags, the active interface version, the recursive-pointer
//! identity maps, and the pointer-keeper list that owns anything allocated
//! while reconstructing an `AllowUnmanagedPointers` graph.

use std::any::Any;
use std::collections::HashMap;

use csp_core::{ByteSink, ByteSource, CommonFlags, DataFlags, PtrKeeper};

/// State threaded through a single `serialize_value` call tree.
pub struct SerializeContext<'a> {
    sink: &'a mut dyn ByteSink,
    common_flags: CommonFlags,
    data_flags: DataFlags,
    interface_version: u32,
    interface_versions_not_match: bool,
    pointer_ids: HashMap<usize, u64>,
    next_pointer_id: u64,
}

impl<'a> SerializeContext<'a> {
    pub fn new(
        sink: &'a mut dyn ByteSink,
        common_flags: CommonFlags,
        data_flags: DataFlags,
        interface_version: u32,
    ) -> Self {
        Self {
            sink,
            common_flags,
            data_flags,
            interface_version,
            interface_versions_not_match: false,
            pointer_ids: HashMap::new(),
            next_pointer_id: 1,
        }
    }

    pub fn sink_mut(&mut self) -> &mut dyn ByteSink {
        self.sink
    }

    pub fn common_flags(&self) -> CommonFlags {
        self.common_flags
    }

    pub fn data_flags(&self) -> DataFlags {
        self.data_flags
    }

    pub fn interface_version(&self) -> u32 {
        self.interface_version
    }

    pub fn interface_versions_not_match(&self) -> bool {
        self.interface_versions_not_match
    }

    pub fn set_interface_versions_not_match(&mut self, value: bool) {
        self.interface_versions_not_match = value;
    }

    /// Returns the id already assigned to this pointee's identity, or
    /// `None` and records a fresh one if this is the first time it's seen.
    pub fn pointer_id_for(&mut self, identity: usize) -> (u64, bool) {
        if let Some(&id) = self.pointer_ids.get(&identity) {
            (id, true)
        } else {
            let id = self.next_pointer_id;
            self.next_pointer_id += 1;
            self.pointer_ids.insert(identity, id);
            (id, false)
        }
    }
}

/// State threaded through a single `deserialize_value` call tree.
pub struct DeserializeContext<'a> {
    source: &'a mut dyn ByteSource,
    common_flags: CommonFlags,
    data_flags: DataFlags,
    interface_version: u32,
    interface_versions_not_match: bool,
    pointer_values: HashMap<u64, Box<dyn Any>>,
    /// Owns every heap value materialized while rebuilding a pointer graph;
    /// dropped (and with it, freed) when the context goes out of scope.
    keepers: Vec<PtrKeeper>,
}

impl<'a> DeserializeContext<'a> {
    pub fn new(
        source: &'a mut dyn ByteSource,
        common_flags: CommonFlags,
        data_flags: DataFlags,
        interface_version: u32,
    ) -> Self {
        Self {
            source,
            common_flags,
            data_flags,
            interface_version,
            interface_versions_not_match: false,
            pointer_values: HashMap::new(),
            keepers: Vec::new(),
        }
    }

    pub fn source_mut(&mut self) -> &mut dyn ByteSource {
        self.source
    }

    pub fn common_flags(&self) -> CommonFlags {
        self.common_flags
    }

    pub fn data_flags(&self) -> DataFlags {
        self.data_flags
    }

    pub fn interface_version(&self) -> u32 {
        self.interface_version
    }

    /// Set once the per-payload header has been read (`process::deserialize_message`);
    /// the common-header's own interface-version field doesn't exist until then.
    pub fn set_interface_version(&mut self, value: u32) {
        self.interface_version = value;
    }

    pub fn set_data_flags(&mut self, value: DataFlags) {
        self.data_flags = value;
    }

    pub fn interface_versions_not_match(&self) -> bool {
        self.interface_versions_not_match
    }

    pub fn set_interface_versions_not_match(&mut self, value: bool) {
        self.interface_versions_not_match = value;
    }

    pub fn remember_pointer<T: Any>(&mut self, id: u64, value: T) {
        self.pointer_values.insert(id, Box::new(value));
    }

    pub fn recall_pointer<T: Any>(&mut self, id: u64) -> Option<&T> {
        self.pointer_values.get(&id).and_then(|v| v.downcast_ref())
    }

    pub fn adopt_keeper(&mut self, keeper: PtrKeeper) {
        self.keepers.push(keeper);
    }

    pub fn keeper_count(&self) -> usize {
        self.keepers.len()
    }
}
