//! The framed serial transport the client runs on.
//!
//! Crow/PropCR framing, device discovery and the serial port itself live
//! outside this crate. The client only needs to exchange payloads with an
//! addressed device, manage the per-address baud rate and PropCR byte order,
//! and send a break.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a transport. Passed through unchanged.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The device did not answer.
    #[error("no response from device at address {address}")]
    NoResponse {
        /// Crow address of the silent device.
        address: u8,
    },

    /// The serial port is not open.
    #[error("serial port is not open")]
    PortNotOpen,

    /// The transport rejected the request before sending it.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// The Crow service on the device does not accept this command.
    #[error("command not available on port {port}")]
    CommandNotAvailable {
        /// Crow port the command was sent to.
        port: u8,
    },

    /// I/O error on the serial port.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// A link to one or more Crow devices.
pub trait Transport {
    /// Send `payload` to `port` on the device at `address`.
    ///
    /// Returns the response payload, or an empty vector when
    /// `response_expected` is false.
    fn send_command(
        &mut self,
        address: u8,
        port: u8,
        payload: &[u8],
        response_expected: bool,
    ) -> Result<Vec<u8>, TransportError>;

    /// The local baud rate used for `address`.
    fn baudrate(&self, address: u8) -> u32;

    /// Change the local baud rate used for `address`.
    fn set_baudrate(&mut self, address: u8, baudrate: u32) -> Result<(), TransportError>;

    /// Hold the line low for `duration`.
    fn send_break(&mut self, duration: Duration) -> Result<(), TransportError>;

    /// Whether PropCR byte order is used for `address`. `None` means the
    /// transport's default.
    fn propcr_order(&self, address: u8) -> Option<bool>;

    /// Select the byte order for `address`, or restore the default with `None`.
    fn set_propcr_order(&mut self, address: u8, order: Option<bool>) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_command(
        &mut self,
        address: u8,
        port: u8,
        payload: &[u8],
        response_expected: bool,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).send_command(address, port, payload, response_expected)
    }

    fn baudrate(&self, address: u8) -> u32 {
        (**self).baudrate(address)
    }

    fn set_baudrate(&mut self, address: u8, baudrate: u32) -> Result<(), TransportError> {
        (**self).set_baudrate(address, baudrate)
    }

    fn send_break(&mut self, duration: Duration) -> Result<(), TransportError> {
        (**self).send_break(duration)
    }

    fn propcr_order(&self, address: u8) -> Option<bool> {
        (**self).propcr_order(address)
    }

    fn set_propcr_order(&mut self, address: u8, order: Option<bool>) -> Result<(), TransportError> {
        (**self).set_propcr_order(address, order)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_command(
        &mut self,
        address: u8,
        port: u8,
        payload: &[u8],
        response_expected: bool,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).send_command(address, port, payload, response_expected)
    }

    fn baudrate(&self, address: u8) -> u32 {
        (**self).baudrate(address)
    }

    fn set_baudrate(&mut self, address: u8, baudrate: u32) -> Result<(), TransportError> {
        (**self).set_baudrate(address, baudrate)
    }

    fn send_break(&mut self, duration: Duration) -> Result<(), TransportError> {
        (**self).send_break(duration)
    }

    fn propcr_order(&self, address: u8) -> Option<bool> {
        (**self).propcr_order(address)
    }

    fn set_propcr_order(&mut self, address: u8, order: Option<bool>) -> Result<(), TransportError> {
        (**self).set_propcr_order(address, order)
    }
}
