//! Metrics for the PeekPoke client.
//!
//! Every metric the client records is declared here as a structured [`Metric`]
//! constant, so names can't drift between the recording site and dashboards.
//! The `metrics` crate is re-exported for convenience. Without an installed
//! recorder all recording is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use peekpoke_metrics::{metric_defs, describe_metrics, DeviceLabels};
//!
//! // After installing a recorder:
//! describe_metrics();
//!
//! let labels = DeviceLabels::new(1, 112);
//! metrics::counter!(metric_defs::TRANSACTIONS.name, &labels.with(&[("command", "read_hub".to_string())]))
//!     .increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// What a [`Metric`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Only ever incremented.
    Counter,
    /// Set to the latest value.
    Gauge,
    /// One sample per observation.
    Histogram,
}

impl MetricKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, kind and metadata of one metric, usable in `const` context.
///
/// ```rust
/// use peekpoke_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const FRAMES: Metric = Metric::counter("peekpoke.frames")
///     .with_description("Frames sent")
///     .with_unit(Unit::Count)
///     .with_labels(&["address"]);
///
/// assert_eq!(FRAMES.name, "peekpoke.frames");
/// assert_eq!(FRAMES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// Dotted metric name, `peekpoke.<area>.<what>`.
    pub name: &'static str,
    pub kind: MetricKind,
    pub description: &'static str,
    pub unit: Option<Unit>,
    /// Label keys the recording sites attach.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Metric {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    pub const fn counter(name: &'static str) -> Self {
        Metric::new(name, MetricKind::Counter)
    }

    pub const fn gauge(name: &'static str) -> Self {
        Metric::new(name, MetricKind::Gauge)
    }

    pub const fn histogram(name: &'static str) -> Self {
        Metric::new(name, MetricKind::Histogram)
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Hand the description and unit to the installed recorder.
    pub fn describe(&self) {
        let name = self.name;
        let text = self.description;
        match self.kind {
            MetricKind::Counter => match self.unit {
                Some(unit) => describe_counter!(name, unit, text),
                None => describe_counter!(name, text),
            },
            MetricKind::Gauge => match self.unit {
                Some(unit) => describe_gauge!(name, unit, text),
                None => describe_gauge!(name, text),
            },
            MetricKind::Histogram => match self.unit {
                Some(unit) => describe_histogram!(name, unit, text),
                None => describe_histogram!(name, text),
            },
        }
    }
}

/// All metric definitions for the client.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Standard Label Keys
    // ========================================================================

    /// Labels present on every device-scoped metric.
    pub const DEVICE_LABELS: &[&str] = &["address", "port"];

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Transactions that completed with a valid, successful response.
    ///
    /// Labels: address, port, command
    pub const TRANSACTIONS: Metric = Metric::counter("peekpoke.client.transactions")
        .with_description("Transactions completed successfully")
        .with_unit(Unit::Count)
        .with_labels(&["address", "port", "command"]);

    /// Transactions that failed in the transport, the codec or on the device.
    ///
    /// Labels: address, port, command, reason
    pub const TRANSACTION_FAILURES: Metric = Metric::counter("peekpoke.client.transaction_failures")
        .with_description("Transactions that failed")
        .with_unit(Unit::Count)
        .with_labels(&["address", "port", "command", "reason"]);

    /// Wall time from sending a command to having its validated response.
    ///
    /// Labels: address, port, command
    pub const TRANSACTION_DURATION: Metric = Metric::histogram("peekpoke.client.transaction_duration")
        .with_description("Round-trip time of a transaction")
        .with_unit(Unit::Seconds)
        .with_labels(&["address", "port", "command"]);

    // ========================================================================
    // Hub Memory
    // ========================================================================

    /// Hub bytes read.
    pub const BYTES_READ: Metric = Metric::counter("peekpoke.hub.bytes_read")
        .with_description("Hub bytes read")
        .with_unit(Unit::Bytes)
        .with_labels(&["address", "port"]);

    /// Hub bytes written.
    pub const BYTES_WRITTEN: Metric = Metric::counter("peekpoke.hub.bytes_written")
        .with_description("Hub bytes written")
        .with_unit(Unit::Bytes)
        .with_labels(&["address", "port"]);

    // ========================================================================
    // Serial Link
    // ========================================================================

    /// Baud rate switches and reverts.
    ///
    /// Labels: address, port, direction (`switch` or `revert`)
    pub const BAUDRATE_CHANGES: Metric = Metric::counter("peekpoke.link.baudrate_changes")
        .with_description("Baud rate switches and reverts")
        .with_unit(Unit::Count)
        .with_labels(&["address", "port", "direction"]);

    /// Current local baud rate.
    pub const BAUDRATE: Metric = Metric::gauge("peekpoke.link.baudrate")
        .with_description("Current local baud rate")
        .with_unit(Unit::BitsPerSecond)
        .with_labels(&["address", "port"]);

    /// Everything above, for [`describe_metrics`](super::describe_metrics).
    pub const ALL: &[&Metric] = &[
        &TRANSACTIONS,
        &TRANSACTION_FAILURES,
        &TRANSACTION_DURATION,
        &BYTES_READ,
        &BYTES_WRITTEN,
        &BAUDRATE_CHANGES,
        &BAUDRATE,
    ];
}

/// Labels identifying a device on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLabels {
    /// Crow device address.
    pub address: u8,
    /// Crow port.
    pub port: u8,
}

impl DeviceLabels {
    pub fn new(address: u8, port: u8) -> Self {
        Self { address, port }
    }

    /// Key/value pairs in the form the `metrics` macros take.
    ///
    /// ```rust
    /// use peekpoke_metrics::DeviceLabels;
    ///
    /// let labels = DeviceLabels::new(5, 112).to_labels();
    /// assert_eq!(labels, vec![("address", "5".to_string()), ("port", "112".to_string())]);
    /// ```
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("address", self.address.to_string()),
            ("port", self.port.to_string()),
        ]
    }

    /// The device labels followed by `extra`.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Describes all client metrics.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
