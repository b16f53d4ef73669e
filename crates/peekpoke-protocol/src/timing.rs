//! Serial timing derivation.
//!
//! The device samples bits by counting system clock cycles, so a new baud rate
//! is expressed as a set of cycle counts computed from the clock frequency.
//! Everything here is integer arithmetic and rounds toward zero.

use crate::error::RangeError;
use crate::types::SerialTimings;

/// Compute the timings that make the device run at `baudrate`.
///
/// `break_duration_ms` is the break the host will send to force a revert; the
/// device is told to detect half of it so detection is dependable.
pub fn derive_timings(
    clkfreq: u64,
    baudrate: u32,
    break_duration_ms: u32,
    min_two_bit_period: u32,
) -> Result<SerialTimings, RangeError> {
    RangeError::check("baudrate", baudrate as i128, 1, u32::MAX as i128)?;
    RangeError::check("clkfreq", clkfreq as i128, 1, u32::MAX as i128)?;

    let clkfreq = clkfreq as i128;
    let baud = baudrate as i128;

    let two_bit_period = 2 * clkfreq / baud;
    if two_bit_period < min_two_bit_period as i128 {
        // Report the offending baud rate against the fastest usable one.
        let max_baud = 2 * clkfreq / min_two_bit_period.max(1) as i128;
        return Err(RangeError::new("baudrate", baud, 1, max_baud));
    }

    let bit_period_0 = two_bit_period >> 1;
    let bit_period_1 = bit_period_0 + (two_bit_period & 1);
    let start_bit_wait = ((bit_period_0 >> 1) - 10).max(5);
    let stop_bit_duration = 10 * clkfreq / baud - 5 * bit_period_0 - 4 * bit_period_1 + 1;
    let interbyte_timeout = (clkfreq / 1000).max(2 * two_bit_period);
    let recovery_time = two_bit_period << 3;
    let break_multiple = (break_duration_ms as i128 * clkfreq / 2000) / recovery_time;

    Ok(SerialTimings {
        bit_period_0: to_u32("bit_period_0", bit_period_0)?,
        bit_period_1: to_u32("bit_period_1", bit_period_1)?,
        start_bit_wait: to_u32("start_bit_wait", start_bit_wait)?,
        stop_bit_duration: to_u32("stop_bit_duration", stop_bit_duration)?,
        interbyte_timeout: to_u32("interbyte_timeout", interbyte_timeout)?,
        recovery_time: to_u32("recovery_time", recovery_time)?,
        break_multiple: to_u32("break_multiple", break_multiple)?,
    })
}

/// Estimate the device clock from its current timings and baud rate.
///
/// Errors accumulate if this is used for several switches in a row.
pub fn estimate_clkfreq(timings: &SerialTimings, baudrate: u32) -> u64 {
    (timings.bit_period_0 as u64 + timings.bit_period_1 as u64) * baudrate as u64 / 2
}

fn to_u32(what: &str, value: i128) -> Result<u32, RangeError> {
    RangeError::check(what, value, 0, u32::MAX as i128)?;
    Ok(value as u32)
}
