//! Common types used in the PeekPoke protocol.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, RestrictedAddressError};

/// Byte order for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least significant byte first (the Propeller's native order).
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Alignment policy applied to integer accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// No alignment check.
    Byte,
    /// Address must be a multiple of 2.
    Word,
    /// Address must be a multiple of 4.
    Long,
    /// Address must be a multiple of the value's width.
    #[default]
    Natural,
}

impl Alignment {
    /// The required address multiple for a value of `width` bytes.
    pub fn multiple(&self, width: usize) -> usize {
        match self {
            Alignment::Byte => 1,
            Alignment::Word => 2,
            Alignment::Long => 4,
            Alignment::Natural => width.max(1),
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alignment::Byte => write!(f, "byte"),
            Alignment::Word => write!(f, "word"),
            Alignment::Long => write!(f, "long"),
            Alignment::Natural => write!(f, "natural"),
        }
    }
}

/// Text encoding used for hub strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// One byte per character, code points 0..=255.
    #[default]
    Latin1,
    /// UTF-8.
    Utf8,
}

impl TextEncoding {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf8 => "utf-8",
        }
    }
}

/// The device's serial bit-sampling configuration.
///
/// All values are in system clock cycles except `break_multiple`, which counts
/// recovery periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerialTimings {
    /// Duration of even-numbered bits.
    pub bit_period_0: u32,
    /// Duration of odd-numbered bits.
    pub bit_period_1: u32,
    /// Wait after the start bit edge before sampling.
    pub start_bit_wait: u32,
    /// Duration of the stop bit when transmitting.
    pub stop_bit_duration: u32,
    /// Silence that ends a packet.
    pub interbyte_timeout: u32,
    /// Idle time required before listening again.
    pub recovery_time: u32,
    /// Recovery periods of continuous low that count as a break.
    pub break_multiple: u32,
}

impl SerialTimings {
    /// Encode as the 28-byte little-endian block.
    pub fn encode(&self) -> [u8; SERIAL_TIMINGS_SIZE] {
        let mut out = [0u8; SERIAL_TIMINGS_SIZE];
        let mut buf = &mut out[..];
        buf.put_u32_le(self.bit_period_0);
        buf.put_u32_le(self.bit_period_1);
        buf.put_u32_le(self.start_bit_wait);
        buf.put_u32_le(self.stop_bit_duration);
        buf.put_u32_le(self.interbyte_timeout);
        buf.put_u32_le(self.recovery_time);
        buf.put_u32_le(self.break_multiple);
        out
    }

    /// Decode from the 28-byte little-endian block.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() != SERIAL_TIMINGS_SIZE {
            return Err(ProtocolError::SizeMismatch {
                expected: SERIAL_TIMINGS_SIZE,
                actual: data.len(),
            });
        }
        let mut buf = data;
        Ok(SerialTimings {
            bit_period_0: buf.get_u32_le(),
            bit_period_1: buf.get_u32_le(),
            start_bit_wait: buf.get_u32_le(),
            stop_bit_duration: buf.get_u32_le(),
            interbyte_timeout: buf.get_u32_le(),
            recovery_time: buf.get_u32_le(),
            break_multiple: buf.get_u32_le(),
        })
    }
}

impl std::fmt::Display for SerialTimings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bit_period_0: {}, bit_period_1: {}, start_bit_wait: {}, stop_bit_duration: {}, \
             interbyte_timeout: {}, recovery_time: {}, break_multiple: {}",
            self.bit_period_0,
            self.bit_period_1,
            self.start_bit_wait,
            self.stop_bit_duration,
            self.interbyte_timeout,
            self.recovery_time,
            self.break_multiple
        )
    }
}

/// Snapshot of a device's identity and capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Identifies the implementation's memory layout.
    pub layout_id: [u8; LAYOUT_ID_SIZE],
    /// The `par` pointer, root of the device's address table.
    pub par: u16,
    /// Capability block; absent on firmware that only reports the minimum.
    pub details: Option<DeviceDetails>,
}

/// Extended capability block of the info response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDetails {
    /// Bit `n` set means command code `n` is available.
    pub available_commands: u16,
    /// Largest atomic read the device accepts.
    pub max_atomic_read: u16,
    /// Largest atomic write the device accepts.
    pub max_atomic_write: u16,
    /// User-assigned instance identifier.
    pub identifier: u32,
    /// Lowest readable hub address.
    pub min_read_address: u16,
    /// Highest readable hub address.
    pub max_read_address: u16,
    /// Lowest writable hub address.
    pub min_write_address: u16,
    /// Highest writable hub address.
    pub max_write_address: u16,
    /// Layout of the serial timings block.
    pub serial_timings_format: u8,
    /// Protocol version implemented by the device.
    pub protocol_version: u8,
}

/// Direction of a hub memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    Read,
    Write,
}

impl std::fmt::Display for MemoryAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryAccess::Read => write!(f, "read"),
            MemoryAccess::Write => write!(f, "write"),
        }
    }
}

impl DeviceDetails {
    /// Whether the device reports `code` as available.
    pub fn is_available(&self, code: u8) -> bool {
        code < 16 && self.available_commands & (1 << code) != 0
    }

    /// Inclusive address range the device allows for `access`.
    pub fn address_range(&self, access: MemoryAccess) -> (u16, u16) {
        match access {
            MemoryAccess::Read => (self.min_read_address, self.max_read_address),
            MemoryAccess::Write => (self.min_write_address, self.max_write_address),
        }
    }

    /// Check that `count` bytes from `address` lie inside the allowed range.
    ///
    /// A span that runs past 65535 continues at 0, so both of its pieces are
    /// checked.
    pub fn check_access(
        &self,
        access: MemoryAccess,
        address: u16,
        count: usize,
    ) -> Result<(), RestrictedAddressError> {
        if count == 0 {
            return Ok(());
        }
        let (min, max) = self.address_range(access);
        let last = address as usize + count.min(HUB_SIZE) - 1;
        let inside = if last <= MAX_HUB_ADDRESS as usize {
            address >= min && last as u16 <= max
        } else {
            // Wrapped: [address, 65535] then [0, last - 65536].
            address >= min && max == MAX_HUB_ADDRESS && min == 0
        };
        if !inside {
            return Err(RestrictedAddressError {
                access,
                address,
                count,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl DeviceInfo {
    /// Decode the info payload (header already removed).
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < MIN_INFO_SIZE {
            return Err(ProtocolError::TooShort {
                expected: MIN_INFO_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let mut layout_id = [0u8; LAYOUT_ID_SIZE];
        buf.copy_to_slice(&mut layout_id);
        let par = buf.get_u16_le();

        let details = if data.len() >= FULL_INFO_SIZE {
            Some(DeviceDetails {
                available_commands: buf.get_u16_le(),
                max_atomic_read: buf.get_u16_le(),
                max_atomic_write: buf.get_u16_le(),
                identifier: buf.get_u32_le(),
                min_read_address: buf.get_u16_le(),
                max_read_address: buf.get_u16_le(),
                min_write_address: buf.get_u16_le(),
                max_write_address: buf.get_u16_le(),
                serial_timings_format: buf.get_u8(),
                protocol_version: buf.get_u8(),
            })
        } else {
            None
        };

        Ok(DeviceInfo {
            layout_id,
            par,
            details,
        })
    }

    /// Encode the info payload. Used by device simulators.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FULL_INFO_SIZE);
        buf.extend_from_slice(&self.layout_id);
        buf.put_u16_le(self.par);
        if let Some(d) = &self.details {
            buf.put_u16_le(d.available_commands);
            buf.put_u16_le(d.max_atomic_read);
            buf.put_u16_le(d.max_atomic_write);
            buf.put_u32_le(d.identifier);
            buf.put_u16_le(d.min_read_address);
            buf.put_u16_le(d.max_read_address);
            buf.put_u16_le(d.min_write_address);
            buf.put_u16_le(d.max_write_address);
            buf.put_u8(d.serial_timings_format);
            buf.put_u8(d.protocol_version);
        }
        buf
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layout_id: {}, par: {:#06x}", hex_string(&self.layout_id), self.par)?;
        if let Some(d) = &self.details {
            write!(
                f,
                ", identifier: {:#010x}, available_commands: {:#06x}, max_atomic_read: {}, \
                 max_atomic_write: {}, read range: [{:#06x}, {:#06x}], write range: [{:#06x}, {:#06x}], \
                 serial_timings_format: {}, version: {}",
                d.identifier,
                d.available_commands,
                d.max_atomic_read,
                d.max_atomic_write,
                d.min_read_address,
                d.max_read_address,
                d.min_write_address,
                d.max_write_address,
                d.serial_timings_format,
                d.protocol_version
            )?;
        }
        Ok(())
    }
}

/// Lowercase hex, no separators. For logs.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}
