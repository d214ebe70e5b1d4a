//! `colorimeter`: monitor an OPT4048 colorimeter board from the terminal.

use clap::Parser;
use colorimeter_monitor::metric_defs::describe_metrics;
use colorimeter_monitor::transport::list_ports;
use colorimeter_monitor::{
    Cli, DisplaySink, JsonDisplay, MonitorConfig, OutputFormat, Session, SessionEnd, StopSignal,
    TerminalDisplay,
};
use crossbeam_channel::Sender;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::thread;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Forward each line typed on stdin as a command until stdin closes.
fn spawn_stdin_reader(commands: Sender<String>) {
    let spawned = thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if commands.send(line).is_err() {
                    break;
                }
            }
            debug!("stdin closed");
        });
    if let Err(e) = spawned {
        error!("Failed to start stdin reader: {}", e);
    }
}

fn make_display(config: &MonitorConfig) -> Box<dyn DisplaySink> {
    match config.output {
        OutputFormat::Text => Box::new(TerminalDisplay::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonDisplay::new(io::stdout())),
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list_ports {
        for port in list_ports()? {
            println!("{}", port);
        }
        return Ok(());
    }

    let config = cli.resolve()?;
    let Some(link) = &config.link else {
        return Err("no link configured".into());
    };
    describe_metrics();

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.stop())?;

    let (tx, rx) = crossbeam_channel::unbounded();
    spawn_stdin_reader(tx);

    let mut session = Session::open(
        link,
        config.read_timeout(),
        make_display(&config),
        config.session_options(),
    )?;
    let end = session.run(&stop, &rx);

    let stats = session.stats();
    info!(
        "Session ended: {} lines, {} readings, {} points, {} rejected, {} commands",
        stats.lines,
        stats.readings,
        stats.points_plotted,
        stats.chromaticity_rejected,
        stats.commands_sent
    );

    match end {
        SessionEnd::Stopped | SessionEnd::PeerClosed => Ok(()),
        SessionEnd::ReadFailed(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
