//! Hub address arithmetic.
//!
//! The hub is a 64 KiB space and addresses wrap modulo 65536. A single
//! transaction may never cross the wrap point, so [`chunks`] always ends a
//! chunk at address 65535 and resumes at 0.

use crate::constants::*;
use crate::error::{AlignmentError, RangeError};
use crate::types::Alignment;

/// Check that `address` is a valid hub address.
pub fn normalize(address: u32) -> Result<u16, RangeError> {
    RangeError::check("hub address", address as i128, 0, MAX_HUB_ADDRESS as i128)?;
    Ok(address as u16)
}

/// `(address + count) mod 65536`.
pub fn wrap_add(address: u16, count: usize) -> u16 {
    ((address as usize + count) % HUB_SIZE) as u16
}

/// Split `total` bytes starting at `address` into transaction-sized pieces.
///
/// Each chunk is at most `max_chunk` bytes and never spans the wrap point.
/// Yields nothing if `max_chunk` is zero.
pub fn chunks(address: u16, total: usize, max_chunk: usize) -> Chunks {
    Chunks {
        address,
        remaining: if max_chunk == 0 { 0 } else { total },
        max_chunk,
    }
}

/// Iterator over `(address, count)` pairs. See [`chunks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunks {
    address: u16,
    remaining: usize,
    max_chunk: usize,
}

impl Iterator for Chunks {
    type Item = (u16, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let to_wrap = HUB_SIZE - self.address as usize;
        let count = self.remaining.min(self.max_chunk).min(to_wrap);
        let start = self.address;
        self.address = wrap_add(start, count);
        self.remaining -= count;
        Some((start, count))
    }
}

/// Check that a single transaction of `count` bytes at `address` is legal.
pub fn check_atomic_span(address: u16, count: usize, max: usize) -> Result<(), RangeError> {
    RangeError::check("count", count as i128, 0, max as i128)?;
    if count > 0 {
        let last = address as i128 + count as i128 - 1;
        RangeError::check("end address", last, 0, MAX_HUB_ADDRESS as i128)?;
    }
    Ok(())
}

/// Whether `address` satisfies `policy` for a `width`-byte value.
pub fn is_aligned(address: u16, width: usize, policy: Alignment) -> bool {
    address as usize % policy.multiple(width) == 0
}

/// Like [`is_aligned`], but reports a misaligned address as an [`AlignmentError`].
///
/// ```rust
/// use peekpoke_protocol::{hub::check_alignment, Alignment};
///
/// assert!(check_alignment(0x102, 2, Alignment::Natural).is_ok());
/// let err = check_alignment(0x102, 4, Alignment::Long).unwrap_err();
/// assert_eq!((err.address, err.width), (0x102, 4));
/// ```
pub fn check_alignment(address: u16, width: usize, policy: Alignment) -> Result<(), AlignmentError> {
    if !is_aligned(address, width, policy) {
        return Err(AlignmentError {
            address,
            width,
            policy,
        });
    }
    Ok(())
}
