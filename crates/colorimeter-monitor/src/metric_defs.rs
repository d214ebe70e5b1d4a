//! Metric declarations for the monitor.
//!
//! Every metric is declared once as a const [`Metric`] so call sites share a single
//! name and description. Counters are recorded through the `metrics` facade; without
//! an installed recorder they are no-ops.
//!
//! ```rust
//! use colorimeter_monitor::metric_defs::{MetricKind, LINES_RECEIVED};
//!
//! assert_eq!(LINES_RECEIVED.name, "colorimeter.session.lines_received");
//! assert_eq!(LINES_RECEIVED.kind, MetricKind::Counter);
//! ```

use metrics::{describe_counter, describe_gauge, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name.
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// The unit of measurement.
    pub unit: Option<Unit>,
}

impl Metric {
    /// Creates a counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
        }
    }

    /// Creates a gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
        }
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Bytes read from the link.
pub const BYTES_RECEIVED: Metric = Metric::counter("colorimeter.session.bytes_received")
    .with_description("Bytes read from the link")
    .with_unit(Unit::Bytes);

/// Non-empty lines assembled from the stream.
pub const LINES_RECEIVED: Metric = Metric::counter("colorimeter.session.lines_received")
    .with_description("Non-empty telemetry lines received")
    .with_unit(Unit::Count);

/// Lines that carried at least one recognized field.
pub const READINGS_DECODED: Metric = Metric::counter("colorimeter.session.readings_decoded")
    .with_description("Lines carrying at least one recognized field")
    .with_unit(Unit::Count);

/// Chromaticity points placed on the diagram.
pub const POINTS_PLOTTED: Metric = Metric::counter("colorimeter.session.points_plotted")
    .with_description("Chromaticity points placed on the diagram")
    .with_unit(Unit::Count);

/// Chromaticity pairs with no displayable color.
pub const CHROMATICITY_REJECTED: Metric =
    Metric::counter("colorimeter.session.chromaticity_rejected")
        .with_description("Chromaticity pairs that could not be converted to a color")
        .with_unit(Unit::Count);

/// Commands written to the link.
pub const COMMANDS_SENT: Metric = Metric::counter("colorimeter.session.commands_sent")
    .with_description("Commands written to the link")
    .with_unit(Unit::Count);

/// Reads or writes that failed.
pub const LINK_ERRORS: Metric = Metric::counter("colorimeter.session.link_errors")
    .with_description("Failed reads and writes on the link")
    .with_unit(Unit::Count);

/// Whether a link is currently open (1) or not (0).
pub const CONNECTED: Metric = Metric::gauge("colorimeter.session.connected")
    .with_description("1 while a link is open, 0 otherwise");

/// Every metric the monitor records.
pub const ALL: &[Metric] = &[
    BYTES_RECEIVED,
    LINES_RECEIVED,
    READINGS_DECODED,
    POINTS_PLOTTED,
    CHROMATICITY_REJECTED,
    COMMANDS_SENT,
    LINK_ERRORS,
    CONNECTED,
];

/// Register descriptions for every metric.
pub fn describe_metrics() {
    for metric in ALL {
        metric.describe();
    }
}
