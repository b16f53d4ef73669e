//! Baud rate negotiation.
//!
//! The device is told its new timings first and the host follows once the
//! device has acknowledged them. Changing the host first would leave the
//! acknowledgment unreadable.

use std::time::Duration;

use peekpoke_metrics::metric_defs;
use peekpoke_protocol::{extract_uint, timing, ByteOrder};
use tracing::{debug, info, warn};

use crate::client::PeekPoke;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Where the device's clock frequency comes from when switching baud rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// A known frequency in Hz.
    Explicit(u64),
    /// The little-endian long at the configured `clkfreq_address`.
    HubLong,
    /// Derived from the device's current timings and the local baud rate.
    #[default]
    Estimate,
}

impl<T: Transport> PeekPoke<T> {
    /// The local baud rate for this device.
    pub fn baudrate(&self) -> u32 {
        self.transport.baudrate(self.device.address())
    }

    /// Change only the local baud rate. The device is not told.
    pub fn set_baudrate(&mut self, baudrate: u32) -> Result<()> {
        self.transport.set_baudrate(self.device.address(), baudrate)?;
        self.record_baudrate(baudrate);
        Ok(())
    }

    /// Estimate the device clock from its timings and the local baud rate.
    ///
    /// Repeated estimates drift; prefer an explicit or hub-stored frequency.
    pub fn estimate_clkfreq(&mut self) -> Result<u64> {
        let timings = self.get_serial_timings()?;
        Ok(timing::estimate_clkfreq(&timings, self.baudrate()))
    }

    fn resolve_clkfreq(&mut self, source: ClockSource) -> Result<u64> {
        let clkfreq = match source {
            ClockSource::Explicit(hz) => hz,
            ClockSource::HubLong => {
                let bytes = self.atomic_read_bytes(self.config.clkfreq_address as u32, 4)?;
                extract_uint(&bytes, 0, 4, ByteOrder::Little)?
            }
            ClockSource::Estimate => self.estimate_clkfreq()?,
        };
        debug!(device = %self.device, clkfreq, source = ?source, "resolved clock frequency");
        Ok(clkfreq)
    }

    /// Move both ends of the link to `baudrate`.
    ///
    /// Fails with a range error, before anything is sent to change timings,
    /// if `baudrate` is too fast for the device clock.
    pub fn switch_baudrate(&mut self, baudrate: u32, source: ClockSource) -> Result<()> {
        let clkfreq = self.resolve_clkfreq(source)?;
        let timings = timing::derive_timings(
            clkfreq,
            baudrate,
            self.config.break_duration_ms,
            self.config.protocol.min_two_bit_period,
        )?;
        debug!(device = %self.device, timings = %timings, "derived serial timings");

        let previous = self.baudrate();
        self.set_serial_timings(&timings)?;
        self.transport.set_baudrate(self.device.address(), baudrate)?;

        info!(device = %self.device, from = previous, to = baudrate, "switched baud rate");
        self.record_change("switch");
        self.record_baudrate(baudrate);
        Ok(())
    }

    /// Return to the last baud rate that carried a successful transaction.
    ///
    /// Sends a break so the device reverts too. The break is not
    /// acknowledged.
    pub fn revert_baudrate(&mut self) -> Result<()> {
        let Some(baudrate) = self.last_good_baudrate else {
            warn!(device = %self.device, "no known good baud rate to revert to");
            return Err(Error::State(format!(
                "cannot revert the baud rate of device {} before a successful transaction",
                self.device
            )));
        };

        self.transport.set_baudrate(self.device.address(), baudrate)?;
        self.transport
            .send_break(Duration::from_millis(self.config.break_duration_ms as u64))?;

        info!(device = %self.device, baudrate, "reverted baud rate");
        self.record_change("revert");
        self.record_baudrate(baudrate);
        Ok(())
    }

    fn record_change(&self, direction: &'static str) {
        let labels = self.device.labels().with(&[("direction", direction.to_string())]);
        metrics::counter!(metric_defs::BAUDRATE_CHANGES.name, &labels[..]).increment(1);
    }

    fn record_baudrate(&self, baudrate: u32) {
        let labels = self.device.labels().to_labels();
        metrics::gauge!(metric_defs::BAUDRATE.name, &labels[..]).set(baudrate as f64);
    }
}
