//! More than one handler may be registered for the same struct id; every
//! one of them runs, but only the first registered handler's reply is
//! sent back (spec §5's multicast rule).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use csp_messaging::{FnHandler, HandlerRegistrar, PartySettings, ServerDispatcher};

use crate::infra::{build_simple_request, decode_data_reply, Ping, Pong};

#[test]
fn every_registered_handler_runs_but_only_the_first_replies() {
    let registrar = Arc::new(HandlerRegistrar::new());
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_first = hits.clone();
    registrar
        .register(
            Arc::new(FnHandler::new(1, move |ping: Ping| {
                hits_first.fetch_add(1, Ordering::SeqCst);
                Ok(Pong(ping.0))
            })),
            true,
        )
        .unwrap();

    let hits_second = hits.clone();
    registrar
        .register(
            Arc::new(FnHandler::new(1, move |ping: Ping| {
                hits_second.fetch_add(1, Ordering::SeqCst);
                Ok(Pong(ping.0 + 1000))
            })),
            true,
        )
        .unwrap();

    let dispatcher = ServerDispatcher::new(registrar, PartySettings::new(1, 1));
    let request = build_simple_request(&Ping(5));
    let reply = dispatcher.handle_message(&request);

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    let (_, pong) = decode_data_reply::<Pong>(&reply);
    assert_eq!(pong.unwrap(), Pong(5));
}
