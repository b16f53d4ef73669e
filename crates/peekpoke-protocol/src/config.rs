//! Protocol layout configuration.
//!
//! Firmware revisions differ in command numbering and buffer sizes. Rather than
//! hardcoding one revision, every such value lives here and defaults to the
//! current firmware.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::RangeError;

/// Command code assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandCodes {
    pub get_info: u8,
    pub read_hub: u8,
    pub write_hub: u8,
    pub read_hub_str: u8,
    pub get_serial_timings: u8,
    pub set_serial_timings: u8,
    pub get_token: u8,
    pub set_token: u8,
    pub execute_payload: u8,
}

impl Default for CommandCodes {
    fn default() -> Self {
        CommandCodes {
            get_info: CMD_GET_INFO,
            read_hub: CMD_READ_HUB,
            write_hub: CMD_WRITE_HUB,
            read_hub_str: CMD_READ_HUB_STR,
            get_serial_timings: CMD_GET_SERIAL_TIMINGS,
            set_serial_timings: CMD_SET_SERIAL_TIMINGS,
            get_token: CMD_GET_TOKEN,
            set_token: CMD_SET_TOKEN,
            execute_payload: CMD_EXECUTE_PAYLOAD,
        }
    }
}

/// Everything about the wire layout that may vary between firmware revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Identifier prefixed to commands; responses repeat the first two bytes.
    pub identifier: [u8; 3],
    /// Command code assignments.
    pub codes: CommandCodes,
    /// Largest count accepted by a single read.
    pub max_atomic_read: usize,
    /// Largest count accepted by a single write.
    pub max_atomic_write: usize,
    /// Largest code block accepted by payload execution.
    pub max_payload_exec: usize,
    /// Smallest usable two-bit period, in clock cycles.
    pub min_two_bit_period: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            identifier: PROTOCOL_IDENTIFIER,
            codes: CommandCodes::default(),
            max_atomic_read: DEFAULT_MAX_ATOMIC_READ,
            max_atomic_write: DEFAULT_MAX_ATOMIC_WRITE,
            max_payload_exec: DEFAULT_MAX_PAYLOAD_EXEC,
            min_two_bit_period: MIN_TWO_BIT_PERIOD,
        }
    }
}

impl ProtocolConfig {
    /// Check that the limits are usable.
    ///
    /// Counts travel as 16-bit fields, so limits above 65535 can't be expressed.
    pub fn validate(&self) -> Result<(), RangeError> {
        RangeError::check("max_atomic_read", self.max_atomic_read as i128, 1, 0xFFFF)?;
        RangeError::check("max_atomic_write", self.max_atomic_write as i128, 1, 0xFFFF)?;
        RangeError::check(
            "max_payload_exec",
            self.max_payload_exec as i128,
            MIN_PAYLOAD_EXEC_SIZE as i128,
            0xFFFF,
        )?;
        RangeError::check("min_two_bit_period", self.min_two_bit_period as i128, 1, u32::MAX as i128)?;
        Ok(())
    }

    /// The two response identifier bytes.
    pub fn response_identifier(&self) -> [u8; 2] {
        [self.identifier[0], self.identifier[1]]
    }
}
