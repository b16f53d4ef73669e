//! Fixed-width integer codec.

use crate::error::RangeError;
use crate::types::ByteOrder;

/// Integer widths accepted by the memory operations.
pub const INT_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Check that `width` is one of [`INT_WIDTHS`].
pub fn check_width(width: usize) -> Result<(), RangeError> {
    if !INT_WIDTHS.contains(&width) {
        return Err(RangeError::new("integer width (1, 2, 4 or 8)", width as i128, 1, 8));
    }
    Ok(())
}

/// Smallest and largest values representable in `width` bytes.
pub fn int_bounds(width: usize, signed: bool) -> Result<(i128, i128), RangeError> {
    check_width(width)?;
    let bits = 8 * width as u32;
    Ok(if signed {
        let half = 1i128 << (bits - 1);
        (-half, half - 1)
    } else {
        (0, (1i128 << bits) - 1)
    })
}

/// Encode `value` as `width` bytes.
pub fn encode_int(
    value: i128,
    width: usize,
    order: ByteOrder,
    signed: bool,
) -> Result<Vec<u8>, RangeError> {
    let (min, max) = int_bounds(width, signed)?;
    RangeError::check("integer value", value, min, max)?;

    let mut bytes = value.to_le_bytes()[..width].to_vec();
    if order == ByteOrder::Big {
        bytes.reverse();
    }
    Ok(bytes)
}

/// Decode an integer from `bytes`, whose length must be one of [`INT_WIDTHS`].
pub fn decode_int(bytes: &[u8], order: ByteOrder, signed: bool) -> Result<i128, RangeError> {
    check_width(bytes.len())?;
    let mut le = [0u8; 16];
    match order {
        ByteOrder::Little => le[..bytes.len()].copy_from_slice(bytes),
        ByteOrder::Big => {
            for (dst, src) in le.iter_mut().zip(bytes.iter().rev()) {
                *dst = *src;
            }
        }
    }
    let raw = u128::from_le_bytes(le) as i128;
    let bits = 8 * bytes.len() as u32;
    Ok(if signed && raw & (1i128 << (bits - 1)) != 0 {
        raw - (1i128 << bits)
    } else {
        raw
    })
}
