//! Protocol constants
//!
//! Default values for the PeekPoke command layout. Everything a firmware
//! revision could change is also carried by [`ProtocolConfig`](crate::ProtocolConfig);
//! these constants are only the defaults it starts from.

// ============================================================================
// Identifier
// ============================================================================

/// Protocol identifier prefixed to every command.
///
/// Responses repeat the first two bytes; the third response byte is the status.
pub const PROTOCOL_IDENTIFIER: [u8; 3] = [0x70, 0x70, 0x00];

// ============================================================================
// Command Codes (host → device)
// ============================================================================

/// Get device info (layout id, par, capabilities).
pub const CMD_GET_INFO: u8 = 0;
/// Read bytes from hub memory.
pub const CMD_READ_HUB: u8 = 1;
/// Write bytes to hub memory.
pub const CMD_WRITE_HUB: u8 = 2;
/// Read a NUL-terminated string from hub memory.
pub const CMD_READ_HUB_STR: u8 = 3;
/// Get the device's serial timings.
pub const CMD_GET_SERIAL_TIMINGS: u8 = 4;
/// Set the device's serial timings.
pub const CMD_SET_SERIAL_TIMINGS: u8 = 5;
/// Get the 4-byte token.
pub const CMD_GET_TOKEN: u8 = 6;
/// Set the 4-byte token, returning the previous value.
pub const CMD_SET_TOKEN: u8 = 7;
/// Load and execute a code block on the device.
pub const CMD_EXECUTE_PAYLOAD: u8 = 8;

// ============================================================================
// Status Codes (device → host, third response byte)
// ============================================================================

/// Command completed.
pub const STATUS_OK: u8 = 0;
/// Command is not available on this device.
pub const STATUS_COMMAND_UNAVAILABLE: u8 = 1;
/// Parameters were missing or malformed.
pub const STATUS_MALFORMED_PARAMETERS: u8 = 2;
/// The response would not fit in the device's buffer.
pub const STATUS_RESPONSE_TOO_LARGE: u8 = 3;

// ============================================================================
// Sizes
// ============================================================================

/// Size of the command and response headers.
pub const HEADER_SIZE: usize = 4;
/// Number of addressable hub bytes.
pub const HUB_SIZE: usize = 65536;
/// Highest hub address.
pub const MAX_HUB_ADDRESS: u16 = 0xFFFF;
/// Size of the serial timings block.
pub const SERIAL_TIMINGS_SIZE: usize = 28;
/// Size of the token.
pub const TOKEN_SIZE: usize = 4;
/// Size of the layout identifier in the info response.
pub const LAYOUT_ID_SIZE: usize = 4;
/// Minimum info payload: layout id + par.
pub const MIN_INFO_SIZE: usize = 6;
/// Full info payload including the device details block.
pub const FULL_INFO_SIZE: usize = 26;
/// Smallest code block accepted for payload execution.
pub const MIN_PAYLOAD_EXEC_SIZE: usize = 4;

/// Default atomic read ceiling of the current firmware.
pub const DEFAULT_MAX_ATOMIC_READ: usize = 260;
/// Default atomic write ceiling of the current firmware.
pub const DEFAULT_MAX_ATOMIC_WRITE: usize = 256;
/// Default code block ceiling for payload execution.
pub const DEFAULT_MAX_PAYLOAD_EXEC: usize = 260;

// ============================================================================
// Timing
// ============================================================================

/// Smallest two-bit period (in clock cycles) the device can sample reliably.
pub const MIN_TWO_BIT_PERIOD: u32 = 52;
/// Default break duration used for baud rate reversion, in milliseconds.
pub const DEFAULT_BREAK_DURATION_MS: u32 = 400;
