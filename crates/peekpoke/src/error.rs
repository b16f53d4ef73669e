//! Client error type.

use peekpoke_protocol::{
    AlignmentError, DeviceStatusError, EncodingError, ProtocolError, RangeError, ResponseError,
    RestrictedAddressError,
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything a client operation can fail with.
#[derive(Error, Debug)]
pub enum Error {
    /// An argument was outside its legal bounds. Nothing was sent.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// An address failed the alignment policy. Nothing was sent.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// The access is outside the range the device reports. Nothing was sent.
    #[error(transparent)]
    Restricted(#[from] RestrictedAddressError),

    /// The response was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The device refused the command.
    #[error(transparent)]
    DeviceStatus(#[from] DeviceStatusError),

    /// The operation needs state the client doesn't have yet.
    #[error("invalid state: {0}")]
    State(String),

    /// Text could not be encoded or decoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Protocol(e) => Error::Protocol(e),
            ResponseError::Device(e) => Error::DeviceStatus(e),
        }
    }
}

impl Error {
    /// Short name of the error kind, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Range(_) => "range",
            Error::Alignment(_) => "alignment",
            Error::Restricted(_) => "restricted",
            Error::Protocol(_) => "protocol",
            Error::DeviceStatus(_) => "device_status",
            Error::State(_) => "state",
            Error::Encoding(_) => "encoding",
            Error::Transport(_) => "transport",
            Error::Config(_) => "config",
        }
    }
}
