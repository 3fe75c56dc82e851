//! `gamepad-to-crsf`: a USB gamepad as a CRSF handset.
//!
//! Samples a gamepad at 1 kHz, conditions the axes, routes sources onto 16
//! logical channels and streams packed CRSF frames to an RF module over
//! serial, while a drain thread decodes telemetry coming back and a UDP
//! control plane applies live tuning from the GUI.

use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gamepad_to_crsf::control;
use gamepad_to_crsf::orchestrator::Orchestrator;
use gamepad_to_crsf::pad::PadSource;
use gamepad_to_crsf::serial::{LinkError, SerialLink};
use gamepad_to_crsf::settings::{self, SETTINGS_PATH};
use gamepad_to_crsf::status::{StatusWriter, STATUS_PATH};
use gamepad_to_crsf::store::TelemetryStore;
use signal_core::SharedTuning;

#[derive(Debug, Parser)]
#[command(name = "gamepad-to-crsf", about = "USB gamepad to CRSF handset")]
struct Cli {
    /// Serial baud rate for the RF module link.
    #[arg(default_value_t = crsf_proto::CRSF_BAUDRATE)]
    baud: u32,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("serial link: {0}")]
    Link(#[from] LinkError),
    #[error("gamepad subsystem: {0}")]
    Pad(#[from] gilrs::Error),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli.baud) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(baud: u32) -> Result<(), AppError> {
    let settings = settings::load(Path::new(SETTINGS_PATH));
    let tuning = Arc::new(SharedTuning::new());
    settings.apply_tuning(&tuning);
    let mapper = Arc::new(Mutex::new(settings.build_mapper()));
    let store = Arc::new(TelemetryStore::new());
    let running = Arc::new(AtomicBool::new(true));

    // Startup failures past this point are fatal; everything after the
    // threads launch degrades instead.
    let link = SerialLink::open(baud, settings.serial_port.as_deref())?;
    let pad = PadSource::new()?;

    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::Relaxed);
        })?;
    }

    let drain = gamepad_to_crsf::serial::spawn_drain(
        link.reader()?,
        Arc::clone(&store),
        Arc::clone(&running),
    )?;

    let listener = control::spawn_listener(
        settings.control_port,
        Arc::clone(&tuning),
        Arc::clone(&mapper),
        Arc::clone(&running),
    );

    let mut orchestrator = Orchestrator::new(
        pad,
        link,
        tuning,
        mapper,
        StatusWriter::new(STATUS_PATH),
        Arc::clone(&running),
    );
    orchestrator.run();

    // The loop only returns once the flag flipped; reap the workers.
    running.store(false, Ordering::Relaxed);
    if drain.join().is_err() {
        warn!("serial drain thread panicked");
    }
    if let Some(listener) = listener {
        if listener.join().is_err() {
            warn!("control plane thread panicked");
        }
    }

    info!("shutdown complete");
    Ok(())
}
