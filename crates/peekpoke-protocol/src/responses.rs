//! Responses from a PeekPoke device.
//!
//! ```text
//! +------+------+--------+------+-----------------+
//! | id 0 | id 1 | status | code | payload...      |
//! +------+------+--------+------+-----------------+
//! ```

use crate::config::ProtocolConfig;
use crate::constants::*;
use crate::error::*;
use crate::types::ByteOrder;

/// A validated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The command code the response answers.
    pub code: u8,
    /// Everything after the 4-byte header.
    pub payload: Vec<u8>,
}

impl Response {
    /// Decode and validate a response to command `code`.
    ///
    /// Checks, in order: minimum length, identifier, command code, device
    /// status, and (when `expected_payload` is given) the exact size.
    pub fn decode(
        frame: &[u8],
        config: &ProtocolConfig,
        code: u8,
        expected_payload: Option<usize>,
    ) -> Result<Self, ResponseError> {
        if frame.len() < HEADER_SIZE {
            return Err(ProtocolError::TooShort {
                expected: HEADER_SIZE,
                actual: frame.len(),
            }
            .into());
        }

        let identifier = [frame[0], frame[1]];
        if identifier != config.response_identifier() {
            return Err(ProtocolError::BadIdentifier {
                expected: config.response_identifier(),
                actual: identifier,
            }
            .into());
        }

        if frame[3] != code {
            return Err(ProtocolError::CodeMismatch {
                expected: code,
                actual: frame[3],
            }
            .into());
        }

        let status = frame[2];
        if status != STATUS_OK {
            return Err(DeviceStatusError {
                code,
                status: DeviceStatus::from_status(status),
            }
            .into());
        }

        if let Some(expected) = expected_payload {
            if frame.len() != HEADER_SIZE + expected {
                return Err(ProtocolError::SizeMismatch {
                    expected: HEADER_SIZE + expected,
                    actual: frame.len(),
                }
                .into());
            }
        }

        log::trace!("decoded response to command {}: {} payload bytes", code, frame.len() - HEADER_SIZE);

        Ok(Response {
            code,
            payload: frame[HEADER_SIZE..].to_vec(),
        })
    }

    /// Build a success response frame. Used by device simulators.
    pub fn encode_ok(config: &ProtocolConfig, code: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&config.response_identifier());
        frame.push(STATUS_OK);
        frame.push(code);
        frame.extend_from_slice(payload);
        frame
    }

    /// Build a status-only failure frame. Used by device simulators.
    pub fn encode_status(config: &ProtocolConfig, code: u8, status: DeviceStatus) -> Vec<u8> {
        let mut frame = Vec::with_capacity(HEADER_SIZE);
        frame.extend_from_slice(&config.response_identifier());
        frame.push(status.into());
        frame.push(code);
        frame
    }
}

/// Extract an unsigned integer of `width` bytes (1..=8) at `offset`.
pub fn extract_uint(
    data: &[u8],
    offset: usize,
    width: usize,
    order: ByteOrder,
) -> Result<u64, ProtocolError> {
    debug_assert!((1..=8).contains(&width));
    let end = offset + width;
    if data.len() < end {
        return Err(ProtocolError::TooShort {
            expected: end,
            actual: data.len(),
        });
    }
    let field = &data[offset..end];
    let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;
    Ok(match order {
        ByteOrder::Little => field.iter().rev().fold(0, fold),
        ByteOrder::Big => field.iter().fold(0, fold),
    })
}
