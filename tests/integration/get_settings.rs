//! `GetSettings` answers with a `Data`-framed `CspPartySettings` value
//! (spec §6 / §8 scenario 2) carrying the server's own negotiable
//! settings, including the `(interfaceId, interfaceVersion)` list a flat
//! field sequence couldn't express.

use std::sync::Arc;

use csp_core::{CommonFlags, CommonHeader, DataFlags, Id, MessageKind, VecSink, PROTOCOL_VERSION_1};
use csp_messaging::{CspPartySettings, HandlerRegistrar, PartySettings, ServerDispatcher};

use crate::infra::decode_data_reply;

#[test]
fn get_settings_reply_echoes_the_servers_party_settings() {
    let interface_a = Id::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0100);
    let settings = PartySettings::new(1, 3)
        .with_mandatory_data_flags(DataFlags::new(DataFlags::ALLOW_UNMANAGED_POINTERS))
        .with_forbidden_data_flags(DataFlags::new(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL))
        .with_interface_floor(interface_a, 3);
    let dispatcher = ServerDispatcher::new(Arc::new(HandlerRegistrar::new()), settings);

    let mut request = VecSink::new();
    let header = CommonHeader {
        protocol_version: PROTOCOL_VERSION_1,
        message_kind: MessageKind::GetSettings,
        common_flags: CommonFlags::new(0),
    };
    header.serialize(&mut request).unwrap();

    let reply = dispatcher.handle_message(request.as_slice());

    let (common, body) = decode_data_reply::<CspPartySettings>(&reply);
    assert_eq!(common.message_kind, MessageKind::Data);
    let body = body.unwrap();

    assert_eq!(body.supported_protocol_versions, vec![3, 2, 1]);
    assert_eq!(body.mandatory_common_flags, 0);
    assert_eq!(body.forbidden_common_flags, 0);
    assert_eq!(body.mandatory_data_flags, DataFlags::ALLOW_UNMANAGED_POINTERS);
    assert_eq!(body.forbidden_data_flags, DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);
    assert_eq!(body.interfaces, vec![(interface_a, 3)]);
}
