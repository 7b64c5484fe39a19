//! A request carrying a cyclic pointer graph (`AllowUnmanagedPointers` +
//! `CheckRecursivePointers`) survives a full dispatcher round trip and
//! comes back with the cycle intact, not unrolled or truncated.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use csp_core::{DataFlags, PROTOCOL_VERSION_1};
use csp_messaging::{FnHandler, HandlerRegistrar, PartySettings, ServerDispatcher};

use crate::infra::{build_data_request, decode_data_reply, Node};

#[test]
fn a_self_referential_chain_round_trips_through_a_handler() {
    let inner = Rc::new(RefCell::new(Node::default()));
    inner.borrow_mut().next = Some(inner.clone());
    let root = Node {
        value: 1,
        next: Some(inner),
    };

    let registrar = Arc::new(HandlerRegistrar::new());
    registrar
        .register(Arc::new(FnHandler::new(1, |node: Node| Ok(node))), false)
        .unwrap();
    let dispatcher = ServerDispatcher::new(registrar, PartySettings::new(1, 1));

    let request = build_data_request(
        &root,
        PROTOCOL_VERSION_1,
        csp_core::CommonFlags::new(0),
        DataFlags::new(DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS),
        1,
    );
    let reply = dispatcher.handle_message(&request);

    let (_, recovered) = decode_data_reply::<Node>(&reply);
    let recovered = recovered.unwrap();
    assert_eq!(recovered.value, 1);
    let inner = recovered.next.expect("inner node present");
    assert_eq!(inner.borrow().value, 0);
    let self_link = inner.borrow().next.clone().expect("self link present");
    assert!(Rc::ptr_eq(&inner, &self_link));
}
