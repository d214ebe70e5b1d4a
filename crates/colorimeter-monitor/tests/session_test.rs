//! Session lifecycle tests.
//!
//! A scripted transport replays a fixed sequence of reads (data, idle timeouts, a
//! failure) and records every write and teardown call; a recording display captures
//! every event the session emits. Together they check:
//!
//! 1. Lines split across reads are decoded and plotted once complete.
//! 2. Every way out of the read loop runs the full teardown, in order.
//! 3. Teardown keeps going when one step fails, and is idempotent.
//! 4. Commands are written between reads with a trailing newline.

use colorimeter_color::PlotPoint;
use colorimeter_monitor::{
    DisplaySink, LinkConfig, LogKind, Session, SessionEnd, SessionError, SessionOptions,
    SimulatedTransport, StopSignal, Transport,
};
use colorimeter_protocol::Reading;
use crossbeam_channel::{unbounded, Receiver};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Scripted transport
// ============================================================================

enum Step {
    Data(&'static [u8]),
    Idle,
    Fail(io::ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkCall {
    Write(Vec<u8>),
    ReleaseReader,
    ReleaseWriter,
    Close,
}

#[derive(Default)]
struct ScriptedLink {
    steps: VecDeque<Step>,
    calls: Arc<Mutex<Vec<LinkCall>>>,
    fail_release_reader: bool,
}

impl ScriptedLink {
    fn new(steps: Vec<Step>) -> (Self, Arc<Mutex<Vec<LinkCall>>>) {
        let link = ScriptedLink {
            steps: steps.into(),
            ..Default::default()
        };
        let calls = link.calls.clone();
        (link, calls)
    }

    fn record(&self, call: LinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Transport for ScriptedLink {
    fn name(&self) -> &str {
        "scripted"
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(data)) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Some(Step::Idle) => Err(io::ErrorKind::TimedOut.into()),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "device unplugged")),
            None => Ok(0),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.record(LinkCall::Write(data.to_vec()));
        Ok(())
    }

    fn release_reader(&mut self) -> io::Result<()> {
        self.record(LinkCall::ReleaseReader);
        if self.fail_release_reader {
            return Err(io::Error::new(io::ErrorKind::Other, "reader busy"));
        }
        Ok(())
    }

    fn release_writer(&mut self) -> io::Result<()> {
        self.record(LinkCall::ReleaseWriter);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.record(LinkCall::Close);
        Ok(())
    }
}

// ============================================================================
// Recording display
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Log(LogKind, String),
    Reading(Reading),
    Point(PlotPoint),
    Clear,
}

#[derive(Default)]
struct RecordingDisplay {
    events: Arc<Mutex<Vec<Event>>>,
    stop_after_points: Option<(usize, StopSignal)>,
}

impl RecordingDisplay {
    fn new() -> (Self, Arc<Mutex<Vec<Event>>>) {
        let display = RecordingDisplay::default();
        let events = display.events.clone();
        (display, events)
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl DisplaySink for RecordingDisplay {
    fn log(&mut self, kind: LogKind, message: &str) {
        self.push(Event::Log(kind, message.to_string()));
    }

    fn show_reading(&mut self, reading: &Reading) {
        self.push(Event::Reading(*reading));
    }

    fn show_point(&mut self, point: &PlotPoint) {
        self.push(Event::Point(*point));
        if let Some((limit, stop)) = &self.stop_after_points {
            let points = self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| matches!(e, Event::Point(_)))
                .count();
            if points >= *limit {
                stop.stop();
            }
        }
    }

    fn clear(&mut self) {
        self.push(Event::Clear);
    }
}

fn no_commands() -> Receiver<String> {
    unbounded().1
}

fn points(events: &[Event]) -> Vec<PlotPoint> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Point(p) => Some(*p),
            _ => None,
        })
        .collect()
}

fn logs(events: &[Event], kind: LogKind) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Log(k, m) if *k == kind => Some(m.clone()),
            _ => None,
        })
        .collect()
}

const TEARDOWN: [LinkCall; 3] = [LinkCall::ReleaseReader, LinkCall::ReleaseWriter, LinkCall::Close];

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_lines_split_across_reads_are_plotted() {
    let (link, _calls) = ScriptedLink::new(vec![
        Step::Data(b"CIE x: 0.31"),
        Step::Idle,
        Step::Data(b"27 CIE y: 0.3290 Lux: 12"),
        Step::Data(b"3.456 Color Temperature: 6504.2\r\nLux: 5\r\n"),
    ]);
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());

    let end = session.run(&StopSignal::new(), &no_commands());
    assert!(matches!(end, SessionEnd::PeerClosed));

    let events = events.lock().unwrap();
    let data = logs(&events, LogKind::Data);
    assert_eq!(
        data,
        vec![
            "CIE x: 0.3127 CIE y: 0.3290 Lux: 123.456 Color Temperature: 6504.2",
            "Lux: 5"
        ]
    );

    let plotted = points(&events);
    assert_eq!(plotted.len(), 1);
    assert_eq!(plotted[0].color.to_hex(), "#FFFFFF");
    assert!((plotted[0].position.percent_x - 39.0875).abs() < 1e-9);

    let stats = session.stats();
    assert_eq!(stats.lines, 2);
    assert_eq!(stats.readings, 2);
    assert_eq!(stats.points_plotted, 1);
}

#[test]
fn test_read_error_runs_teardown() {
    let (link, calls) = ScriptedLink::new(vec![
        Step::Data(b"Lux: 1\n"),
        Step::Fail(io::ErrorKind::BrokenPipe),
        Step::Data(b"Lux: 2\n"),
    ]);
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());

    let end = session.run(&StopSignal::new(), &no_commands());
    match end {
        SessionEnd::ReadFailed(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected end: {:?}", other),
    }
    assert!(!session.is_connected());
    assert_eq!(*calls.lock().unwrap(), TEARDOWN.to_vec());

    let events = events.lock().unwrap();
    let errors = logs(&events, LogKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error reading data:"));
    assert!(events.contains(&Event::Clear));
    assert_eq!(
        logs(&events, LogKind::Status).last().unwrap(),
        "Disconnected from scripted"
    );
    // Nothing after the failed read is consumed.
    assert_eq!(logs(&events, LogKind::Data), vec!["Lux: 1"]);
}

#[test]
fn test_stop_signal_ends_loop() {
    let steps = (0..50)
        .map(|_| Step::Data(b"CIE x: 0.44757 CIE y: 0.40745\n"))
        .collect();
    let (link, calls) = ScriptedLink::new(steps);
    let stop = StopSignal::new();
    let (mut display, events) = RecordingDisplay::new();
    display.stop_after_points = Some((3, stop.clone()));

    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());
    let end = session.run(&stop, &no_commands());

    assert!(matches!(end, SessionEnd::Stopped));
    assert_eq!(points(&events.lock().unwrap()).len(), 3);
    assert_eq!(*calls.lock().unwrap(), TEARDOWN.to_vec());
}

#[test]
fn test_commands_written_between_reads() {
    let (link, calls) = ScriptedLink::new(vec![Step::Idle, Step::Idle]);
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());

    let (tx, rx) = unbounded();
    tx.send("MODE 1".to_string()).unwrap();
    tx.send("bad\ncommand".to_string()).unwrap();
    let end = session.run(&StopSignal::new(), &rx);
    assert!(matches!(end, SessionEnd::PeerClosed));

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0], LinkCall::Write(b"MODE 1\n".to_vec()));
    assert_eq!(calls[1..], TEARDOWN);

    let events = events.lock().unwrap();
    assert_eq!(logs(&events, LogKind::Command), vec!["Sent: MODE 1"]);
    assert_eq!(logs(&events, LogKind::Error).len(), 1);
    assert_eq!(session.stats().commands_sent, 1);
}

#[test]
fn test_startup_commands_sent_on_connect() {
    let (link, calls) = ScriptedLink::new(Vec::new());
    let (display, events) = RecordingDisplay::new();
    let options = SessionOptions {
        startup_commands: vec!["RESET".to_string(), "MODE 2".to_string()],
        ..SessionOptions::default()
    };
    let session = Session::connect(Box::new(link), display, options);

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            LinkCall::Write(b"RESET\n".to_vec()),
            LinkCall::Write(b"MODE 2\n".to_vec())
        ]
    );
    let events = events.lock().unwrap();
    assert_eq!(
        events[0],
        Event::Log(LogKind::Status, "Connected to scripted".to_string())
    );
    assert_eq!(logs(&events, LogKind::Command), vec!["Sent: RESET", "Sent: MODE 2"]);
    drop(events);
    drop(session);
}

#[test]
fn test_disconnect_twice_is_noop() {
    let (link, calls) = ScriptedLink::new(Vec::new());
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());

    session.disconnect();
    let after_first = events.lock().unwrap().len();
    session.disconnect();
    drop(session);

    assert_eq!(events.lock().unwrap().len(), after_first);
    assert_eq!(*calls.lock().unwrap(), TEARDOWN.to_vec());
}

#[test]
fn test_teardown_continues_after_release_failure() {
    let (mut link, calls) = ScriptedLink::new(Vec::new());
    link.fail_release_reader = true;
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());

    session.disconnect();

    assert_eq!(*calls.lock().unwrap(), TEARDOWN.to_vec());
    assert!(!session.is_connected());
    assert_eq!(
        logs(&events.lock().unwrap(), LogKind::Status).last().unwrap(),
        "Disconnected from scripted"
    );
}

#[test]
fn test_drop_disconnects() {
    let (link, calls) = ScriptedLink::new(Vec::new());
    let (display, events) = RecordingDisplay::new();
    let session = Session::connect(Box::new(link), display, SessionOptions::default());
    drop(session);

    assert_eq!(*calls.lock().unwrap(), TEARDOWN.to_vec());
    assert!(events.lock().unwrap().contains(&Event::Clear));
}

#[test]
fn test_send_after_disconnect_fails() {
    let (link, calls) = ScriptedLink::new(Vec::new());
    let (display, _events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());
    session.disconnect();

    assert!(matches!(
        session.send_command("MODE 1"),
        Err(SessionError::NotConnected)
    ));
    assert!(!calls
        .lock()
        .unwrap()
        .iter()
        .any(|c| matches!(c, LinkCall::Write(_))));
}

#[test]
fn test_unplottable_chromaticity() {
    let (link, _calls) = ScriptedLink::new(vec![
        Step::Data(b"CIE x: 0.3 CIE y: 0\n"),
        Step::Data(b"CIE x: 1.5 CIE y: 0.3\n"),
        Step::Data(b"CIE x: 1.2.3 CIE y: 0.3\n"),
    ]);
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());
    session.run(&StopSignal::new(), &no_commands());

    let events = events.lock().unwrap();
    assert!(points(&events).is_empty());
    let stats = session.stats();
    assert_eq!(stats.readings, 3);
    assert_eq!(stats.chromaticity_rejected, 2);
}

#[test]
fn test_empty_and_free_text_lines() {
    let (link, _calls) = ScriptedLink::new(vec![Step::Data(b"\r\n\r\n  \nOPT4048 ready\n")]);
    let (display, events) = RecordingDisplay::new();
    let mut session = Session::connect(Box::new(link), display, SessionOptions::default());
    session.run(&StopSignal::new(), &no_commands());

    let events = events.lock().unwrap();
    assert_eq!(logs(&events, LogKind::Data), vec!["OPT4048 ready"]);
    assert!(!events.iter().any(|e| matches!(e, Event::Reading(_))));
}

#[test]
fn test_open_failure_reported() {
    let (display, events) = RecordingDisplay::new();
    let config = LinkConfig::Serial {
        path: "/dev/does-not-exist-colorimeter".to_string(),
        baud_rate: 115_200,
    };
    let result = Session::open(
        &config,
        Duration::from_millis(10),
        display,
        SessionOptions::default(),
    );
    assert!(matches!(result, Err(SessionError::Connect(_))));

    let events = events.lock().unwrap();
    assert!(logs(&events, LogKind::Error)[0].starts_with("Error connecting:"));
    assert_eq!(logs(&events, LogKind::Status), vec!["Connection failed"]);
}

#[test]
fn test_simulated_board_end_to_end() {
    let sim = SimulatedTransport::new(Vec::new(), Duration::ZERO, Duration::from_millis(5)).unwrap();
    let stop = StopSignal::new();
    let (mut display, events) = RecordingDisplay::new();
    display.stop_after_points = Some((3, stop.clone()));

    let mut session = Session::connect(Box::new(sim), display, SessionOptions::default());
    let end = session.run(&stop, &no_commands());
    assert!(matches!(end, SessionEnd::Stopped));

    let events = events.lock().unwrap();
    let plotted = points(&events);
    assert_eq!(plotted.len(), 3);
    for point in &plotted {
        assert!(point.position.is_visible());
    }
    // Daylight, incandescent, then shade: red falls and blue rises from the warm scene.
    assert!(plotted[1].color.r >= plotted[1].color.b);
    assert!(plotted[2].color.b > plotted[1].color.b);
    assert_eq!(
        logs(&events, LogKind::Data)[0],
        colorimeter_monitor::simulate::BANNER
    );
}
