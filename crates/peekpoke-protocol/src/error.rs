//! Protocol error types.

use thiserror::Error;

use crate::types::{Alignment, MemoryAccess};

/// An argument was outside its legal bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what} {value} is out of range [{min}, {max}]")]
pub struct RangeError {
    /// What was being checked (e.g. "hub address").
    pub what: String,
    /// The offending value.
    pub value: i128,
    /// Smallest legal value.
    pub min: i128,
    /// Largest legal value.
    pub max: i128,
}

impl RangeError {
    /// Create a range error for `what`.
    pub fn new(what: impl Into<String>, value: i128, min: i128, max: i128) -> Self {
        RangeError {
            what: what.into(),
            value,
            min,
            max,
        }
    }

    /// Check `value` against `[min, max]`.
    pub fn check(what: &str, value: i128, min: i128, max: i128) -> Result<(), RangeError> {
        if value < min || value > max {
            return Err(RangeError::new(what, value, min, max));
        }
        Ok(())
    }
}

/// An address failed the requested alignment policy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("address {address:#06x} is not aligned for a {width}-byte value under {policy} alignment")]
pub struct AlignmentError {
    /// The offending address.
    pub address: u16,
    /// Width of the value being accessed.
    pub width: usize,
    /// The policy that was applied.
    pub policy: Alignment,
}

/// A memory access falls outside the address range the device reports.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{access} of {count} bytes at {address:#06x} is outside the allowed range [{min:#06x}, {max:#06x}]")]
pub struct RestrictedAddressError {
    pub access: MemoryAccess,
    /// First hub address of the access.
    pub address: u16,
    pub count: usize,
    /// Lowest allowed address.
    pub min: u16,
    /// Highest allowed address.
    pub max: u16,
}

/// A response did not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Response is too short to be valid.
    #[error("response too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Response does not start with the protocol identifier.
    #[error("bad response identifier: expected {expected:02X?}, got {actual:02X?}")]
    BadIdentifier {
        /// Expected identifier bytes.
        expected: [u8; 2],
        /// Identifier bytes received.
        actual: [u8; 2],
    },

    /// Response is for a different command.
    #[error("response code mismatch: sent command {expected}, response is for {actual}")]
    CodeMismatch {
        /// The command code that was sent.
        expected: u8,
        /// The code in the response.
        actual: u8,
    },

    /// Response length differs from what the command requires.
    #[error("response size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },
}

/// Status values reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// The command is not available (unknown or disabled).
    CommandUnavailable,
    /// Parameters were missing or malformed (includes wraparound requests).
    MalformedParameters,
    /// The response would exceed the device's buffer.
    ResponseTooLarge,
    /// A reserved or unknown status value.
    Unknown(u8),
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::CommandUnavailable => write!(f, "command not available"),
            DeviceStatus::MalformedParameters => write!(f, "malformed or missing parameters"),
            DeviceStatus::ResponseTooLarge => write!(f, "response too large"),
            DeviceStatus::Unknown(code) => write!(f, "unknown status ({})", code),
        }
    }
}

impl DeviceStatus {
    /// Interpret a non-zero status byte.
    pub fn from_status(code: u8) -> Self {
        use crate::constants::*;
        match code {
            STATUS_COMMAND_UNAVAILABLE => DeviceStatus::CommandUnavailable,
            STATUS_MALFORMED_PARAMETERS => DeviceStatus::MalformedParameters,
            STATUS_RESPONSE_TOO_LARGE => DeviceStatus::ResponseTooLarge,
            _ => DeviceStatus::Unknown(code),
        }
    }
}

impl From<DeviceStatus> for u8 {
    fn from(status: DeviceStatus) -> Self {
        use crate::constants::*;
        match status {
            DeviceStatus::CommandUnavailable => STATUS_COMMAND_UNAVAILABLE,
            DeviceStatus::MalformedParameters => STATUS_MALFORMED_PARAMETERS,
            DeviceStatus::ResponseTooLarge => STATUS_RESPONSE_TOO_LARGE,
            DeviceStatus::Unknown(code) => code,
        }
    }
}

/// The device explicitly refused a command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("device rejected command {code}: {status}")]
pub struct DeviceStatusError {
    /// The command code that was refused.
    pub code: u8,
    /// What the device reported.
    pub status: DeviceStatus,
}

/// Errors from decoding a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The response was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The response was well formed but reported a failure.
    #[error(transparent)]
    Device(#[from] DeviceStatusError),
}

/// Text could not be converted to or from bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A character has no representation in the chosen encoding.
    #[error("character {ch:?} at index {index} cannot be encoded as {encoding}")]
    Unencodable {
        /// The character.
        ch: char,
        /// Its char index in the string.
        index: usize,
        /// Name of the encoding.
        encoding: &'static str,
    },

    /// Bytes were not valid in the chosen encoding.
    #[error("invalid {encoding} at byte {valid_up_to}")]
    InvalidBytes {
        /// Length of the valid prefix.
        valid_up_to: usize,
        /// Name of the encoding.
        encoding: &'static str,
    },
}
