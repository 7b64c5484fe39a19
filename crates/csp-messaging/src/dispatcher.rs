//! Server dispatch loop (spec §4.L), grounded on
//! `summitd::dispatch::ServiceDispatcher`: deserialize the common header,
//! branch on message kind, and for `Data` look up the registered
//! handler(s) and run them. Multicast handlers replay the same body by
//! seeking the source back to just after the per-payload header for each
//! one in turn, mirroring the original's reuse of a single deserialized
//! byte range across every registered listener.
//!
//! A panic inside a handler is caught at this boundary and turned into
//! `Status::Internal` rather than taking the whole dispatcher down —
//! the same "one bad handler shouldn't sink the process" discipline the
//! teacher's chunk dispatcher gets from `Result`-returning services, made
//! explicit here because handler bodies are arbitrary user closures.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use csp_core::{
    ByteSink, ByteSource, CommonHeader, DataFlags, MessageKind, SliceSource, Status, VecSink,
    PROTOCOL_VERSION_1, PROTOCOL_VERSION_UNDEFINED,
};
use csp_codec::{data_context, process, DeserializeContext, SerializeContext};

use crate::handler::ServerDataHandler;
use crate::registrar::HandlerRegistrar;
use crate::settings::{CspPartySettings, PartySettings};
use crate::status_codec::{self, StatusBody};

pub struct ServerDispatcher {
    registrar: Arc<HandlerRegistrar>,
    settings: PartySettings,
}

impl ServerDispatcher {
    pub fn new(registrar: Arc<HandlerRegistrar>, settings: PartySettings) -> Self {
        Self { registrar, settings }
    }

    /// Process one request end to end, returning the reply bytes. Never
    /// fails outright: every error path converges on a `Status` reply.
    pub fn handle_message(&self, request: &[u8]) -> Vec<u8> {
        let mut reply = VecSink::new();
        if let Err(status) = self.try_handle_message(request, &mut reply) {
            reply.clear();
            // Best-effort recovery of the request's own header so the
            // reply can echo its protocol version and common flags; falls
            // back to the "undefined protocol version" case (spec §4.I)
            // when even that couldn't be parsed.
            let mut source = SliceSource::new(request);
            let echo = CommonHeader::deserialize(&mut source, 0, u16::MAX).ok();
            self.write_status_reply(status, echo.as_ref(), &mut reply);
        }
        reply.into_inner()
    }

    fn try_handle_message(&self, request: &[u8], reply: &mut VecSink) -> csp_core::CspResult<()> {
        let mut source = SliceSource::new(request);
        let common = CommonHeader::deserialize(
            &mut source,
            self.settings.min_protocol_version,
            self.settings.max_protocol_version,
        )?;

        match common.message_kind {
            MessageKind::Data => {
                self.settings.validate_common_flags(common.common_flags)?;
                self.handle_data(&common, &mut source, reply)
            }
            MessageKind::GetSettings => self.handle_get_settings(&common, reply),
            MessageKind::CommonCapabilitiesRequest => {
                tracing::warn!("CommonCapabilitiesRequest has no registered responder");
                Err(Status::Internal)
            }
            MessageKind::Status => {
                tracing::warn!("received a Status message as a request; nothing to dispatch");
                Err(Status::InvalidArgument)
            }
        }
    }

    fn write_status_reply(&self, status: Status, echo: Option<&CommonHeader>, reply: &mut VecSink) {
        let (protocol_version, common_flags) = match echo {
            Some(h) if status != Status::NotSupportedProtocolVersion => {
                (h.protocol_version, h.common_flags)
            }
            _ => (PROTOCOL_VERSION_UNDEFINED, csp_core::CommonFlags::new(0)),
        };
        let header = CommonHeader {
            protocol_version,
            message_kind: MessageKind::Status,
            common_flags,
        };
        // The `Status` reply's own header is always written with no-checks
        // semantics: a peer that sent an unrecognized protocol version
        // still needs to be able to decode this much.
        let _ = header.serialize(reply);
        let body = match status {
            Status::NotSupportedProtocolVersion => StatusBody::NotSupportedProtocolVersion {
                supported_versions: self.settings.supported_protocol_versions(),
            },
            _ => StatusBody::None,
        };
        let _ = status_codec::write_status(status, body, common_flags, reply);
    }

    fn handle_data(
        &self,
        common: &CommonHeader,
        source: &mut SliceSource,
        reply: &mut VecSink,
    ) -> csp_core::CspResult<()> {
        let raw = data_context::read_header_unchecked(source)?;
        let after_header = source.tell();
        let data_flags = DataFlags::new(raw.data_flags);

        // §4.K trichotomy: exactly one handler is the common case; more
        // than one falls back to `acquire_many` for multicast replay.
        let acquired = match self.registrar.acquire(raw.struct_id) {
            Ok(single) => single,
            Err(Status::MoreEntires) => self.registrar.acquire_many(raw.struct_id)?,
            Err(status) => return Err(status),
        };
        let mut first_error = None;
        let mut primary_reply = None;

        for (index, handler) in acquired.handlers().iter().enumerate() {
            source.seek(after_header)?;
            match self.run_one_handler(handler.as_ref(), common, raw.interface_version, data_flags, source) {
                Ok(body) if index == 0 => primary_reply = Some(body),
                Ok(_) => {}
                Err(status) => {
                    tracing::warn!(handler_index = index, %status, "multicast handler failed");
                    first_error = Status::keep_first_error(first_error, status);
                }
            }
        }

        match primary_reply {
            Some(body) => {
                reply.append(&body)?;
                Ok(())
            }
            None => Err(first_error.unwrap_or(Status::NoSuchHandler)),
        }
    }

    fn run_one_handler(
        &self,
        handler: &dyn ServerDataHandler,
        common: &CommonHeader,
        interface_version: u32,
        data_flags: DataFlags,
        source: &mut dyn csp_core::ByteSource,
    ) -> csp_core::CspResult<Vec<u8>> {
        handler.check_policies_compliance(data_flags)?;

        let mut dctx = DeserializeContext::new(source, common.common_flags, data_flags, interface_version);

        let mut body_sink = VecSink::new();
        let reply_header = CommonHeader {
            protocol_version: common.protocol_version,
            message_kind: MessageKind::Data,
            common_flags: common.common_flags,
        };
        reply_header.serialize(&mut body_sink)?;
        let mut sctx = SerializeContext::new(&mut body_sink, common.common_flags, data_flags, interface_version);

        match catch_unwind(AssertUnwindSafe(|| handler.handle_message(&mut dctx, &mut sctx))) {
            Ok(Ok(())) => Ok(body_sink.into_inner()),
            Ok(Err(status)) => Err(status),
            Err(_) => {
                tracing::error!("handler panicked");
                Err(Status::Internal)
            }
        }
    }

    /// Reply to `GetSettings` with this server's own `PartySettings`,
    /// framed as a `Data` message carrying a `CspPartySettings` value
    /// (spec §6 / §8 scenario 2) — the reply has a registered struct
    /// identity like any other payload, it just happens to be
    /// infrastructure rather than application data.
    fn handle_get_settings(
        &self,
        common: &CommonHeader,
        reply: &mut VecSink,
    ) -> csp_core::CspResult<()> {
        let header = CommonHeader {
            protocol_version: common.protocol_version,
            message_kind: MessageKind::Data,
            common_flags: common.common_flags,
        };
        header.serialize(reply)?;

        let body = CspPartySettings::from(&self.settings);
        let mut sctx = SerializeContext::new(reply, common.common_flags, DataFlags::new(0), 1);
        process::serialize_message(&body, &mut sctx)
    }
}
