//! A peer still on interface version 1 sends (and expects to receive) the
//! legacy `ProfileV1` wire shape even though the registered handler works
//! entirely in terms of the current `Profile` type — the version
//! converter hooks on both sides of the handler do the translation.

use std::sync::Arc;

use csp_core::{CommonFlags, DataFlags, PROTOCOL_VERSION_1};
use csp_messaging::{FnHandler, HandlerRegistrar, PartySettings, ServerDispatcher};

use crate::infra::{build_data_request, decode_data_reply, Profile, ProfileV1};

#[test]
fn a_v1_peer_is_answered_in_the_v1_shape() {
    let registrar = Arc::new(HandlerRegistrar::new());
    registrar
        .register(
            Arc::new(FnHandler::new(1, |profile: Profile| {
                Ok(Profile {
                    name_len: profile.name_len,
                    display_color: 7,
                })
            })),
            false,
        )
        .unwrap();
    let dispatcher = ServerDispatcher::new(registrar, PartySettings::new(1, 1));

    let request = build_data_request(
        &ProfileV1 { name_len: 5 },
        PROTOCOL_VERSION_1,
        CommonFlags::new(0),
        DataFlags::new(0),
        1,
    );
    let reply = dispatcher.handle_message(&request);

    let (_, legacy) = decode_data_reply::<ProfileV1>(&reply);
    assert_eq!(legacy.unwrap(), ProfileV1 { name_len: 5 });
}

#[test]
fn a_current_peer_is_answered_in_the_current_shape() {
    let registrar = Arc::new(HandlerRegistrar::new());
    registrar
        .register(
            Arc::new(FnHandler::new(1, |profile: Profile| {
                Ok(Profile {
                    name_len: profile.name_len,
                    display_color: 7,
                })
            })),
            false,
        )
        .unwrap();
    let dispatcher = ServerDispatcher::new(registrar, PartySettings::new(1, 1));

    let request = build_data_request(
        &Profile {
            name_len: 5,
            display_color: 0,
        },
        PROTOCOL_VERSION_1,
        CommonFlags::new(0),
        DataFlags::new(0),
        2,
    );
    let reply = dispatcher.handle_message(&request);

    let (_, current) = decode_data_reply::<Profile>(&reply);
    assert_eq!(
        current.unwrap(),
        Profile {
            name_len: 5,
            display_color: 7
        }
    );
}
