//! Shared fixtures for the end-to-end scenarios: a couple of plain
//! request/response structs, a struct with a one-step legacy chain, and
//! a singly-linked, possibly cyclic node type, plus small helpers for
//! building a request and unpacking a reply without repeating the
//! header plumbing in every test.

use std::cell::RefCell;
use std::rc::Rc;

use csp_codec::layout::LayoutCategory;
use csp_codec::{process, DeserializeContext, Serializable, SerializeContext};
use csp_core::{
    primitive, CommonFlags, CommonHeader, CspResult, DataFlags, Id, Interface, MessageKind,
    SliceSource, VecSink, PROTOCOL_VERSION_1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping(pub u32);

impl Serializable for Ping {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0001)
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0100), 1)
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        primitive::write_u32(self.0, ctx.common_flags(), ctx.sink_mut())
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        Ok(Ping(primitive::read_u32(ctx.common_flags(), ctx.source_mut())?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong(pub u32);

impl Serializable for Pong {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0002)
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0100), 1)
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        primitive::write_u32(self.0, ctx.common_flags(), ctx.sink_mut())
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        Ok(Pong(primitive::read_u32(ctx.common_flags(), ctx.source_mut())?))
    }
}

/// The legacy (version 1) wire representation of `Profile`: name length
/// only, no display-color field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileV1 {
    pub name_len: u32,
}

impl Serializable for ProfileV1 {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0003)
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0101), 1)
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        primitive::write_u32(self.name_len, ctx.common_flags(), ctx.sink_mut())
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        Ok(ProfileV1 {
            name_len: primitive::read_u32(ctx.common_flags(), ctx.source_mut())?,
        })
    }
}

/// Current (version 2) representation: adds `display_color`. Declares a
/// one-step legacy chain down to `ProfileV1` for peers still on interface
/// version 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub name_len: u32,
    pub display_color: u32,
}

impl Serializable for Profile {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        // Same struct id as `ProfileV1` — they are two wire
        // representations of one struct identity, distinguished by
        // interface version, not struct id (spec §3).
        ProfileV1::struct_id()
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0101), 2)
    }

    fn min_supported_interface_version() -> u32 {
        1
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        primitive::write_u32(self.name_len, ctx.common_flags(), ctx.sink_mut())?;
        primitive::write_u32(self.display_color, ctx.common_flags(), ctx.sink_mut())
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        let name_len = primitive::read_u32(ctx.common_flags(), ctx.source_mut())?;
        let display_color = primitive::read_u32(ctx.common_flags(), ctx.source_mut())?;
        Ok(Profile {
            name_len,
            display_color,
        })
    }

    fn try_serialize_legacy(&self, ctx: &mut SerializeContext) -> CspResult<csp_codec::ConvertOutcome> {
        if ctx.interface_version() >= Self::latest_interface_version() {
            return Ok(csp_codec::ConvertOutcome::NotApplicable);
        }
        let legacy = ProfileV1 {
            name_len: self.name_len,
        };
        process::serialize_value(&legacy, ctx)?;
        Ok(csp_codec::ConvertOutcome::Done)
    }

    fn try_deserialize_legacy(ctx: &mut DeserializeContext) -> CspResult<Option<Self>> {
        if ctx.interface_version() >= Self::latest_interface_version() {
            return Ok(None);
        }
        let legacy = process::deserialize_value::<ProfileV1>(ctx)?;
        Ok(Some(Profile {
            name_len: legacy.name_len,
            display_color: 0,
        }))
    }
}

/// A singly-linked node, used for the `AllowUnmanagedPointers` /
/// `CheckRecursivePointers` scenario. May form a cycle.
#[derive(Debug, Default)]
pub struct Node {
    pub value: i32,
    pub next: Option<Rc<RefCell<Node>>>,
}

impl Serializable for Node {
    const LAYOUT: LayoutCategory = LayoutCategory::FieldByField;

    fn struct_id() -> Id {
        Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0004)
    }

    fn interface() -> Interface {
        Interface::new(Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0102), 1).with_pointer_flags()
    }

    fn serialize_body(&self, ctx: &mut SerializeContext) -> CspResult<()> {
        primitive::write_i32(self.value, ctx.common_flags(), ctx.sink_mut())?;
        csp_codec::pointers::serialize_pointer(&self.next, ctx)
    }

    fn deserialize_body(ctx: &mut DeserializeContext) -> CspResult<Self> {
        let value = primitive::read_i32(ctx.common_flags(), ctx.source_mut())?;
        let next = csp_codec::pointers::deserialize_pointer::<Node>(ctx)?;
        Ok(Node { value, next })
    }
}

/// Small extension so `Node::interface()` can declare the data flags it
/// requires without a bespoke `Interface` constructor per pointer-bearing
/// test type.
trait InterfaceExt {
    fn with_pointer_flags(self) -> Self;
}

impl InterfaceExt for Interface {
    fn with_pointer_flags(mut self) -> Self {
        self.mandatory_data_flags = DataFlags::new(
            DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS,
        );
        self
    }
}

/// Build a full `Data` request: common header, per-payload header, body.
pub fn build_data_request<T: Serializable>(
    value: &T,
    protocol_version: u16,
    common_flags: CommonFlags,
    data_flags: DataFlags,
    interface_version: u32,
) -> Vec<u8> {
    let mut sink = VecSink::new();
    let common = CommonHeader {
        protocol_version,
        message_kind: MessageKind::Data,
        common_flags,
    };
    common.serialize(&mut sink).unwrap();
    let mut sctx = SerializeContext::new(&mut sink, common_flags, data_flags, interface_version);
    process::serialize_message(value, &mut sctx).unwrap();
    sink.into_inner()
}

/// The usual case: protocol version 1, no elastic/pointer flags, latest
/// interface version.
pub fn build_simple_request<T: Serializable>(value: &T) -> Vec<u8> {
    build_data_request(
        value,
        PROTOCOL_VERSION_1,
        CommonFlags::new(0),
        DataFlags::new(0),
        T::latest_interface_version(),
    )
}

/// Decode a `Data` reply's common header and body as `T`.
pub fn decode_data_reply<T: Serializable>(reply: &[u8]) -> (CommonHeader, CspResult<T>) {
    let mut source = SliceSource::new(reply);
    let common = CommonHeader::deserialize(&mut source, 0, u16::MAX).unwrap();
    let mut dctx = DeserializeContext::new(&mut source, common.common_flags, DataFlags::new(0), 0);
    let value = process::deserialize_message::<T>(&mut dctx, 0);
    (common, value)
}
