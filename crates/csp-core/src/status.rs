//! Status — the closed set of outcome codes every CSP primitive reports.
//!
//! The wire-visible code is a signed 32-bit integer: zero and positive
//! values are success (`NoError`, `NoFurtherProcessingRequired`), negative
//! values are errors. Rust call sites never construct the two success
//! variants directly — ordinary `Ok(())` plays that role — but both remain
//! representable because a `Status` message on the wire (see
//! `csp-messaging::status_codec`) can legitimately carry either.

use thiserror::Error;

/// The result type used throughout the CSP crates: `Ok` on success,
/// `Err(Status)` carrying one of the error codes below.
pub type CspResult<T> = Result<T, Status>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[repr(i32)]
pub enum Status {
    /// No error. Only ever produced by decoding a wire status code of 0;
    /// Rust call sites signal success with `Ok(())` instead.
    #[error("no error")]
    NoError = 0,
    /// Informational: the caller need not process this value further.
    /// Only meaningful on the wire (see `status_codec`); internally this
    /// outcome is modeled by `csp-codec::convert::ConvertOutcome`.
    #[error("no further processing required")]
    NoFurtherProcessingRequired = 1,

    #[error("out of memory")]
    NoMemory = -1,
    #[error("read past end of buffer")]
    Overflow = -2,
    #[error("invalid argument")]
    InvalidArgument = -3,
    #[error("protocol version not supported")]
    NotSupportedProtocolVersion = -4,
    #[error("interface version not supported")]
    NotSupportedInterfaceVersion = -5,
    #[error("input/output interface version pair not supported")]
    NotSupportedInOutInterfaceVersion = -6,
    #[error("invalid hash")]
    InvalidHash = -7,
    #[error("mismatch of protocol versions")]
    MismatchOfProtocolVersions = -8,
    #[error("mismatch of interface versions")]
    MismatchOfInterfaceVersions = -9,
    #[error("mismatch of struct id")]
    MismatchOfStructId = -10,
    #[error("no such handler")]
    NoSuchHandler = -11,
    #[error("internal error")]
    Internal = -12,
    #[error("serialization settings not supported for struct")]
    NotSupportedSerializationSettingsForStruct = -13,
    #[error("invalid type")]
    InvalidType = -14,
    #[error("data corrupted")]
    DataCorrupted = -15,
    #[error("common flags settings not compatible")]
    NotCompatibleCommonFlagsSettings = -16,
    #[error("data flags settings not compatible")]
    NotCompatibleDataFlagsSettings = -17,
    #[error("more than one entry")]
    MoreEntires = -18,
    #[error("not initialized")]
    NotInited = -19,
    #[error("value overflow")]
    ValueOverflow = -20,
    #[error("no supported interfaces")]
    NoSupportedInterfaces = -21,
    #[error("already initialized")]
    AlreadyInited = -22,
}

impl Status {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn is_success(self) -> bool {
        self.as_i32() >= 0
    }

    pub fn from_i32(code: i32) -> Option<Status> {
        use Status::*;
        Some(match code {
            0 => NoError,
            1 => NoFurtherProcessingRequired,
            -1 => NoMemory,
            -2 => Overflow,
            -3 => InvalidArgument,
            -4 => NotSupportedProtocolVersion,
            -5 => NotSupportedInterfaceVersion,
            -6 => NotSupportedInOutInterfaceVersion,
            -7 => InvalidHash,
            -8 => MismatchOfProtocolVersions,
            -9 => MismatchOfInterfaceVersions,
            -10 => MismatchOfStructId,
            -11 => NoSuchHandler,
            -12 => Internal,
            -13 => NotSupportedSerializationSettingsForStruct,
            -14 => InvalidType,
            -15 => DataCorrupted,
            -16 => NotCompatibleCommonFlagsSettings,
            -17 => NotCompatibleDataFlagsSettings,
            -18 => MoreEntires,
            -19 => NotInited,
            -20 => ValueOverflow,
            -21 => NoSupportedInterfaces,
            -22 => AlreadyInited,
            _ => return None,
        })
    }

    /// Keeps `self` if it is already an error, otherwise adopts `candidate`.
    /// Port of the original `SET_NEW_ERROR` macro: used by multicast
    /// dispatch to remember the first failure while still invoking every
    /// handler.
    pub fn keep_first_error(current: Option<Status>, candidate: Status) -> Option<Status> {
        match current {
            Some(existing) => Some(existing),
            None => Some(candidate),
        }
    }
}
