//! A single registered handler answers a matching request end to end
//! through the dispatcher, not just through the codec directly.

use std::sync::Arc;

use csp_messaging::{FnHandler, HandlerRegistrar, PartySettings, ServerDispatcher};

use crate::infra::{build_simple_request, decode_data_reply, Ping, Pong};

#[test]
fn unicast_handler_answers_a_matching_request() {
    let registrar = Arc::new(HandlerRegistrar::new());
    registrar
        .register(Arc::new(FnHandler::new(1, |ping: Ping| Ok(Pong(ping.0 * 2)))), false)
        .unwrap();
    let dispatcher = ServerDispatcher::new(registrar, PartySettings::new(1, 1));

    let request = build_simple_request(&Ping(21));
    let reply = dispatcher.handle_message(&request);

    let (_, pong) = decode_data_reply::<Pong>(&reply);
    assert_eq!(pong.unwrap(), Pong(42));
}

#[test]
fn a_request_with_no_registered_handler_is_a_status_reply() {
    let dispatcher = ServerDispatcher::new(Arc::new(HandlerRegistrar::new()), PartySettings::new(1, 1));

    let request = build_simple_request(&Ping(1));
    let reply = dispatcher.handle_message(&request);

    let mut source = csp_core::SliceSource::new(&reply);
    let common = csp_core::CommonHeader::deserialize(&mut source, 0, u16::MAX).unwrap();
    assert_eq!(common.message_kind, csp_core::MessageKind::Status);
}
