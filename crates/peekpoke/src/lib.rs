//! PeekPoke host client
//!
//! Reads and writes the hub memory of a Propeller running PeekPoke, and keeps
//! the serial link's baud rate in step on both ends.
//!
//! # Overview
//!
//! - [`PeekPoke`] wraps a [`Transport`] and one device address/port
//! - Atomic operations (`atomic_*`, tokens, timings, payloads) are one transaction each
//! - Memory operations (`read_bytes`, `write_str`, `read_ints`, ...) split large
//!   requests into transactions and may run across the 65535 → 0 wrap, unless
//!   the options ask for a single atomic transaction
//! - [`ClockSource`] selects how `switch_baudrate` learns the device clock
//!
//! # Example
//!
//! ```rust,ignore
//! use peekpoke::{ClientConfig, IntOptions, PeekPoke, StrOptions};
//!
//! let mut pp = PeekPoke::new(serial_link, ClientConfig::default())?;
//! let par = pp.get_par()?;
//! let name = pp.read_str(par as u32, 32, StrOptions::default())?;
//! let version = pp.read_int(par as u32 + 32, 4, IntOptions::default())?;
//! ```

mod baud;
mod client;
pub mod config;
mod error;
pub mod logging;
mod memory;
mod transport;

pub use baud::ClockSource;
pub use client::{DeviceHandle, PeekPoke, TokenOptions, Transaction};
pub use config::{ClientConfig, ConfigError};
pub use error::{Error, Result};
pub use memory::{IntOptions, StrOptions};
pub use transport::{Transport, TransportError};

pub use peekpoke_protocol as protocol;
pub use peekpoke_protocol::{
    Alignment, ByteOrder, DeviceDetails, DeviceInfo, MemoryAccess, ProtocolConfig, SerialTimings,
    TextEncoding,
};
