//! Commands that can be sent to a PeekPoke device.

use bytes::BufMut;

use crate::config::ProtocolConfig;
use crate::constants::*;
use crate::types::{hex_string, SerialTimings};

/// Commands that can be sent to a PeekPoke device.
///
/// Arguments are not range-checked here; the client validates them before
/// building a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Query layout id, par and capabilities.
    GetInfo,

    /// Read bytes from the hub.
    ReadHub {
        /// Start address.
        address: u16,
        /// Number of bytes.
        count: u16,
    },

    /// Write bytes to the hub.
    WriteHub {
        /// Start address.
        address: u16,
        /// Bytes to write.
        data: Vec<u8>,
    },

    /// Read a NUL-terminated string from the hub.
    ReadHubStr {
        /// Start address.
        address: u16,
        /// Maximum number of bytes to return, terminator included.
        max_count: u16,
    },

    /// Get the current serial timings.
    GetSerialTimings,

    /// Replace the serial timings.
    SetSerialTimings {
        /// New timings.
        timings: SerialTimings,
    },

    /// Get the token.
    GetToken,

    /// Replace the token.
    SetToken {
        /// New token value.
        token: [u8; TOKEN_SIZE],
    },

    /// Load a code block into a free cog and run it.
    ExecutePayload {
        /// The code block.
        code: Vec<u8>,
    },
}

impl Command {
    /// The command code for this command under `config`.
    pub fn code(&self, config: &ProtocolConfig) -> u8 {
        let codes = &config.codes;
        match self {
            Command::GetInfo => codes.get_info,
            Command::ReadHub { .. } => codes.read_hub,
            Command::WriteHub { .. } => codes.write_hub,
            Command::ReadHubStr { .. } => codes.read_hub_str,
            Command::GetSerialTimings => codes.get_serial_timings,
            Command::SetSerialTimings { .. } => codes.set_serial_timings,
            Command::GetToken => codes.get_token,
            Command::SetToken { .. } => codes.set_token,
            Command::ExecutePayload { .. } => codes.execute_payload,
        }
    }

    /// Short snake_case name, for logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetInfo => "get_info",
            Command::ReadHub { .. } => "read_hub",
            Command::WriteHub { .. } => "write_hub",
            Command::ReadHubStr { .. } => "read_hub_str",
            Command::GetSerialTimings => "get_serial_timings",
            Command::SetSerialTimings { .. } => "set_serial_timings",
            Command::GetToken => "get_token",
            Command::SetToken { .. } => "set_token",
            Command::ExecutePayload { .. } => "execute_payload",
        }
    }

    /// Exact payload size of a successful response, when it is fixed.
    pub fn expected_payload_size(&self) -> Option<usize> {
        match self {
            Command::ReadHub { count, .. } => Some(*count as usize),
            Command::WriteHub { .. } | Command::SetSerialTimings { .. } => Some(0),
            Command::GetSerialTimings => Some(SERIAL_TIMINGS_SIZE),
            Command::GetToken | Command::SetToken { .. } => Some(TOKEN_SIZE),
            Command::GetInfo | Command::ReadHubStr { .. } | Command::ExecutePayload { .. } => None,
        }
    }

    /// Encode the command to bytes.
    pub fn encode(&self, config: &ProtocolConfig) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.args_len());
        buf.extend_from_slice(&config.identifier);
        buf.push(self.code(config));

        match self {
            Command::GetInfo | Command::GetSerialTimings | Command::GetToken => {}

            Command::ReadHub { address, count } => {
                buf.put_u16_le(*address);
                buf.put_u16_le(*count);
            }

            Command::WriteHub { address, data } => {
                buf.put_u16_le(*address);
                buf.put_u16_le(data.len() as u16);
                buf.extend_from_slice(data);
            }

            Command::ReadHubStr { address, max_count } => {
                buf.put_u16_le(*address);
                buf.put_u16_le(*max_count);
            }

            Command::SetSerialTimings { timings } => {
                buf.extend_from_slice(&timings.encode());
            }

            Command::SetToken { token } => {
                buf.extend_from_slice(token);
            }

            Command::ExecutePayload { code } => {
                buf.extend_from_slice(code);
            }
        }

        log::trace!("encoded PeekPoke command: {}", hex_string(&buf));
        buf
    }

    fn args_len(&self) -> usize {
        match self {
            Command::GetInfo | Command::GetSerialTimings | Command::GetToken => 0,
            Command::ReadHub { .. } | Command::ReadHubStr { .. } => 4,
            Command::WriteHub { data, .. } => 4 + data.len(),
            Command::SetSerialTimings { .. } => SERIAL_TIMINGS_SIZE,
            Command::SetToken { .. } => TOKEN_SIZE,
            Command::ExecutePayload { code } => code.len(),
        }
    }
}
