//! A request declaring a protocol version the server doesn't support gets
//! back a `Status` reply pinned to the documented `-4` wire bytes, never a
//! panic or a silently dropped connection.

use std::sync::Arc;

use csp_core::{CommonHeader, MessageKind, SliceSource, Status, VecSink};
use csp_messaging::{status_codec, HandlerRegistrar, PartySettings, ServerDispatcher};

#[test]
fn unsupported_protocol_version_yields_pinned_status_bytes() {
    let dispatcher = ServerDispatcher::new(Arc::new(HandlerRegistrar::new()), PartySettings::new(1, 1));

    let mut request = VecSink::new();
    request.append(&99u16.to_le_bytes()).unwrap();
    request.append(&(MessageKind::Data.as_u32()).to_le_bytes()).unwrap();
    request.append(&0u32.to_le_bytes()).unwrap();

    let reply = dispatcher.handle_message(request.as_slice());

    assert_eq!(&reply[CommonHeader::WIRE_SIZE..CommonHeader::WIRE_SIZE + 4], &[0xFC, 0xFF, 0xFF, 0xFF]);

    let mut source = SliceSource::new(&reply);
    let common = CommonHeader::deserialize(&mut source, 0, u16::MAX).unwrap();
    assert_eq!(common.message_kind, MessageKind::Status);
    let code = status_codec::read_status_code(common.common_flags, &mut source).unwrap();
    assert_eq!(code, Status::NotSupportedProtocolVersion.as_i32());
    let (min, max) = status_codec::read_protocol_version_body(common.common_flags, &mut source).unwrap();
    assert_eq!((min, max), (1, 1));
}
