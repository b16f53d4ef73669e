//! PeekPoke protocol
//!
//! Types and pure functions for talking to a Propeller running PeekPoke over a
//! Crow/PropCR serial link. Nothing in this crate does I/O; the `peekpoke`
//! crate pairs it with a transport.
//!
//! # Protocol Overview
//!
//! Every command starts with the 3-byte identifier `70 70 00` followed by a
//! command code and arguments. Every response starts with `70 70`, a status
//! byte and the echoed command code.
//!
//! - Hub addresses are 16-bit and wrap modulo 65536 ([`hub`])
//! - Multi-byte fields on the wire are little-endian
//! - Command numbering and buffer limits come from [`ProtocolConfig`]
//!
//! # Example
//!
//! ```rust
//! use peekpoke_protocol::{Command, ProtocolConfig, Response};
//!
//! let config = ProtocolConfig::default();
//! let cmd = Command::ReadHub { address: 0, count: 4 };
//! assert_eq!(cmd.encode(&config), vec![0x70, 0x70, 0x00, 0x01, 0, 0, 4, 0]);
//!
//! let frame = [0x70, 0x70, 0x00, 0x01, 0xde, 0xad, 0xbe, 0xef];
//! let rsp = Response::decode(&frame, &config, 1, cmd.expected_payload_size()).unwrap();
//! assert_eq!(rsp.payload, vec![0xde, 0xad, 0xbe, 0xef]);
//! ```

mod commands;
mod config;
mod constants;
mod error;
pub mod hub;
mod responses;
pub mod scalar;
pub mod text;
pub mod timing;
mod types;

pub use commands::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use responses::*;
pub use types::*;
