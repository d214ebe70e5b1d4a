//! Display sinks.
//!
//! A display shows three things: a raw log of everything received and sent, a panel
//! of the four most recent field values, and a chromaticity marker with a color
//! swatch. [`DisplayState`] holds the panel and marker; the sinks decide how to
//! render it.

use chrono::{Local, Utc};
use colorimeter_color::PlotPoint;
use colorimeter_protocol::{Field, Reading, PLACEHOLDER};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Category of a raw log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// A line received from the board.
    Data,
    /// A connection state change.
    Status,
    /// A failure reported to the operator.
    Error,
    /// A command sent to the board.
    Command,
}

impl LogKind {
    /// Short tag used in text output.
    pub fn tag(&self) -> &'static str {
        match self {
            LogKind::Data => "<<",
            LogKind::Status => "--",
            LogKind::Error => "!!",
            LogKind::Command => ">>",
        }
    }
}

/// Receives decoded telemetry for presentation.
pub trait DisplaySink {
    /// Append an entry to the raw log.
    fn log(&mut self, kind: LogKind, message: &str);

    /// Update the fields present in `reading`; absent fields keep their last value.
    fn show_reading(&mut self, reading: &Reading);

    /// Move the marker and recolor the swatch.
    fn show_point(&mut self, point: &PlotPoint);

    /// Reset every field to the placeholder and hide the marker.
    fn clear(&mut self);
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn log(&mut self, kind: LogKind, message: &str) {
        (**self).log(kind, message)
    }

    fn show_reading(&mut self, reading: &Reading) {
        (**self).show_reading(reading)
    }

    fn show_point(&mut self, point: &PlotPoint) {
        (**self).show_point(point)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// The panel and marker as currently shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    values: Reading,
    marker: Option<PlotPoint>,
}

impl DisplayState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the fields present in `reading`.
    pub fn apply_reading(&mut self, reading: &Reading) {
        for (field, value) in reading.present_fields() {
            match field {
                Field::CieX => self.values.cie_x = Some(value),
                Field::CieY => self.values.cie_y = Some(value),
                Field::Lux => self.values.lux = Some(value),
                Field::ColorTemperature => self.values.color_temp_k = Some(value),
            }
        }
    }

    /// Show the marker at `point`.
    pub fn apply_point(&mut self, point: &PlotPoint) {
        self.marker = Some(*point);
    }

    /// Reset to placeholders with the marker hidden.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Text currently shown for a field.
    pub fn field_text(&self, field: Field) -> String {
        self.values.format(field)
    }

    /// The marker, if visible.
    pub fn marker(&self) -> Option<&PlotPoint> {
        self.marker.as_ref()
    }

    /// One-line rendering of the panel.
    pub fn panel_line(&self) -> String {
        let fields: Vec<String> = Field::ALL
            .iter()
            .map(|f| format!("{}: {}", f.label(), self.field_text(*f)))
            .collect();
        let swatch = match &self.marker {
            Some(point) => point.color.to_hex(),
            None => PLACEHOLDER.to_string(),
        };
        format!("{} | Swatch: {}", fields.join(" | "), swatch)
    }
}

/// Human-readable display on a text stream.
pub struct TerminalDisplay<W: Write> {
    out: W,
    state: DisplayState,
}

impl<W: Write> TerminalDisplay<W> {
    /// Create a display writing to `out`.
    pub fn new(out: W) -> Self {
        TerminalDisplay {
            out,
            state: DisplayState::new(),
        }
    }

    /// The current panel state.
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Consume the display, returning the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            debug!("Display write failed: {}", e);
        }
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn log(&mut self, kind: LogKind, message: &str) {
        let line = format!(
            "[{}] {} {}",
            Local::now().format("%H:%M:%S%.3f"),
            kind.tag(),
            message
        );
        self.emit(&line);
    }

    fn show_reading(&mut self, reading: &Reading) {
        self.state.apply_reading(reading);
        let panel = self.state.panel_line();
        self.emit(&panel);
    }

    fn show_point(&mut self, point: &PlotPoint) {
        self.state.apply_point(point);
        let line = format!(
            "Marker: x={:.1}% y={:.1}%{} | Swatch: {}",
            point.position.percent_x,
            point.position.percent_y,
            if point.position.is_visible() { "" } else { " (off diagram)" },
            point.color.to_css()
        );
        self.emit(&line);
    }

    fn clear(&mut self) {
        self.state.reset();
        let panel = self.state.panel_line();
        self.emit(&panel);
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Log {
        timestamp: String,
        kind: LogKind,
        message: &'a str,
    },
    Reading {
        reading: &'a Reading,
    },
    Point {
        point: &'a PlotPoint,
        hex: String,
    },
    Clear,
}

/// Machine-readable display writing one JSON object per line.
pub struct JsonDisplay<W: Write> {
    out: W,
}

impl<W: Write> JsonDisplay<W> {
    /// Create a display writing to `out`.
    pub fn new(out: W) -> Self {
        JsonDisplay { out }
    }

    /// Consume the display, returning the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        let result = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            debug!("Display write failed: {}", e);
        }
    }
}

impl<W: Write> DisplaySink for JsonDisplay<W> {
    fn log(&mut self, kind: LogKind, message: &str) {
        self.emit(&JsonEvent::Log {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            message,
        });
    }

    fn show_reading(&mut self, reading: &Reading) {
        self.emit(&JsonEvent::Reading { reading });
    }

    fn show_point(&mut self, point: &PlotPoint) {
        self.emit(&JsonEvent::Point {
            point,
            hex: point.color.to_hex(),
        });
    }

    fn clear(&mut self) {
        self.emit(&JsonEvent::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorimeter_color::{to_display_color, PlotBounds};
    use colorimeter_protocol::decode;

    fn point(x: f64, y: f64) -> PlotPoint {
        PlotPoint {
            x,
            y,
            position: PlotBounds::default().position(x, y),
            color: to_display_color(x, y).unwrap(),
        }
    }

    #[test]
    fn test_state_starts_with_placeholders() {
        let state = DisplayState::new();
        for field in Field::ALL {
            assert_eq!(state.field_text(field), "-");
        }
        assert!(state.marker().is_none());
    }

    #[test]
    fn test_state_merges_partial_readings() {
        let mut state = DisplayState::new();
        state.apply_reading(&decode("Lux: 123.456"));
        state.apply_reading(&decode("Color Temperature: 6504.2"));
        assert_eq!(state.field_text(Field::Lux), "123.46");
        assert_eq!(state.field_text(Field::ColorTemperature), "6504");
        assert_eq!(state.field_text(Field::CieX), "-");
    }

    #[test]
    fn test_state_reset() {
        let mut state = DisplayState::new();
        state.apply_reading(&decode("CIE x: 0.3127 CIE y: 0.3290"));
        state.apply_point(&point(0.3127, 0.3290));
        state.reset();
        assert_eq!(state, DisplayState::new());
    }

    #[test]
    fn test_panel_line() {
        let mut state = DisplayState::new();
        state.apply_reading(&decode("CIE x: 0.3127 CIE y: 0.3290 Lux: 5"));
        state.apply_point(&point(0.3127, 0.3290));
        assert_eq!(
            state.panel_line(),
            "CIE x: 0.312700 | CIE y: 0.329000 | Lux: 5.00 | Color Temperature: - | Swatch: #FFFFFF"
        );
    }

    #[test]
    fn test_terminal_output() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.log(LogKind::Command, "Sent: MODE 1");
        display.show_point(&point(0.3127, 0.3290));
        display.clear();
        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(">> Sent: MODE 1"));
        assert_eq!(
            lines[1],
            "Marker: x=39.1% y=63.4% | Swatch: rgb(255, 255, 255)"
        );
        assert!(lines[2].ends_with("Swatch: -"));
    }

    #[test]
    fn test_json_output() {
        let mut display = JsonDisplay::new(Vec::new());
        display.log(LogKind::Data, "Lux: 1");
        display.show_reading(&decode("Lux: 1"));
        display.show_point(&point(0.3127, 0.3290));
        display.clear();
        let text = String::from_utf8(display.into_inner()).unwrap();
        let events: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(events[0]["event"], "log");
        assert_eq!(events[0]["kind"], "data");
        assert_eq!(events[0]["message"], "Lux: 1");
        assert_eq!(events[1]["event"], "reading");
        assert_eq!(events[1]["reading"]["lux"], 1.0);
        assert!(events[1]["reading"]["cie_x"].is_null());
        assert_eq!(events[2]["event"], "point");
        assert_eq!(events[2]["hex"], "#FFFFFF");
        assert_eq!(events[2]["point"]["color"]["r"], 255);
        assert_eq!(events[3]["event"], "clear");
    }
}
