//! UDP control plane: live tuning and mapping updates from the GUI.
//!
//! One ASCII command per datagram. Scalar commands write a single shared
//! tuning cell; `SET_MAP` swaps the whole routing table under the mapping
//! lock. Malformed datagrams are dropped silently; the GUI resends on the
//! next slider movement anyway.
//!
//! # Grammar
//!
//! ```text
//! SET_MAP|<16 source ids>|<target,pos_src,neg_src,pos_center,pos_reverse,neg_center,neg_reverse>
//! L_DZ:<f>  R_DZ:<f>  RATE:<f>  SENS:<f>  SMOOTH:<f>
//! CURVE:<0..3>  EXPO:<f>
//! CINE_ON:<0|1>  CINE_SPD:<f>  CINE_ACC:<f>
//! ```

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signal_core::{InputMapper, SharedTuning, SplitSpec, CHANNELS};
use tracing::{debug, info, warn};

/// Receive timeout; bounds how long shutdown can take.
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// One parsed control-plane command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetMap {
        direct: [i16; CHANNELS],
        split: Option<SplitSpec>,
    },
    LeftDeadzone(f32),
    RightDeadzone(f32),
    Sensitivity(f32),
    Smoothing(f32),
    Curve(u8),
    Expo(f32),
    CineOn(bool),
    CineSpeed(f32),
    CineAccel(f32),
}

/// Parse one datagram. `None` means the datagram is dropped.
#[must_use]
pub fn parse_command(msg: &str) -> Option<Command> {
    let msg = msg.trim();

    if let Some(rest) = msg.strip_prefix("SET_MAP|") {
        return parse_set_map(rest);
    }

    let (prefix, value) = msg.split_once(':')?;
    let value = value.trim();
    match prefix {
        "L_DZ" => value.parse().ok().map(Command::LeftDeadzone),
        "R_DZ" => value.parse().ok().map(Command::RightDeadzone),
        // RATE is the legacy name the GUI still sends for the same knob.
        "RATE" | "SENS" => value.parse().ok().map(Command::Sensitivity),
        "SMOOTH" => value.parse().ok().map(Command::Smoothing),
        "CURVE" => value.parse().ok().map(Command::Curve),
        "EXPO" => value.parse().ok().map(Command::Expo),
        "CINE_ON" => match value {
            "0" => Some(Command::CineOn(false)),
            "1" => Some(Command::CineOn(true)),
            _ => None,
        },
        "CINE_SPD" => value.parse().ok().map(Command::CineSpeed),
        "CINE_ACC" => value.parse().ok().map(Command::CineAccel),
        _ => None,
    }
}

fn parse_set_map(rest: &str) -> Option<Command> {
    let (map_csv, split_csv) = rest.split_once('|')?;

    let mut direct = [0i16; CHANNELS];
    let mut fields = map_csv.split(',');
    for slot in direct.iter_mut() {
        *slot = fields.next()?.trim().parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }

    let mut split = [0i16; 7];
    let mut fields = split_csv.split(',');
    for slot in split.iter_mut() {
        *slot = fields.next()?.trim().parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }

    Some(Command::SetMap {
        direct,
        split: Some(SplitSpec {
            target: split[0],
            pos_src: split[1],
            neg_src: split[2],
            pos_center: split[3] != 0,
            pos_reverse: split[4] != 0,
            neg_center: split[5] != 0,
            neg_reverse: split[6] != 0,
        }),
    })
}

/// Apply a command to the shared state.
pub fn apply_command(cmd: Command, tuning: &SharedTuning, mapper: &Mutex<InputMapper>) {
    match cmd {
        Command::SetMap { direct, split } => {
            let mut mapper = match mapper.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            mapper.apply_packet(&direct, split);
        }
        Command::LeftDeadzone(v) => tuning.set_left_deadzone(v),
        Command::RightDeadzone(v) => tuning.set_right_deadzone(v),
        Command::Sensitivity(v) => tuning.set_sensitivity(v),
        Command::Smoothing(v) => tuning.set_smoothing(v),
        Command::Curve(v) => tuning.set_curve(v),
        Command::Expo(v) => tuning.set_expo(v),
        Command::CineOn(v) => tuning.set_cine_on(v),
        Command::CineSpeed(v) => tuning.set_cine_speed(v),
        Command::CineAccel(v) => tuning.set_cine_accel(v),
    }
}

/// Spawn the listener thread.
///
/// A bind failure is logged and leaves the process running without a
/// control plane; only the GUI loses its knobs, the transmit path is
/// unaffected.
pub fn spawn_listener(
    port: u16,
    tuning: Arc<SharedTuning>,
    mapper: Arc<Mutex<InputMapper>>,
    running: Arc<AtomicBool>,
) -> Option<std::thread::JoinHandle<()>> {
    let socket = match UdpSocket::bind(("0.0.0.0", port)) {
        Ok(socket) => socket,
        Err(e) => {
            warn!("control plane disabled, could not bind UDP port {port}: {e}");
            return None;
        }
    };
    if let Err(e) = socket.set_read_timeout(Some(RECV_TIMEOUT)) {
        warn!("control plane disabled, could not set socket timeout: {e}");
        return None;
    }
    info!("control plane listening on UDP port {port}");

    std::thread::Builder::new()
        .name("control-plane".into())
        .spawn(move || listen_loop(socket, &tuning, &mapper, &running))
        .map_err(|e| warn!("control plane disabled, thread spawn failed: {e}"))
        .ok()
}

fn listen_loop(
    socket: UdpSocket,
    tuning: &SharedTuning,
    mapper: &Mutex<InputMapper>,
    running: &AtomicBool,
) {
    let mut buf = [0u8; 1024];
    while running.load(Ordering::Relaxed) {
        let n = match socket.recv_from(&mut buf) {
            Ok((n, _)) => n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                debug!("control socket receive error: {e}");
                continue;
            }
        };

        let Ok(text) = std::str::from_utf8(&buf[..n]) else {
            continue;
        };
        match parse_command(text) {
            Some(cmd) => {
                debug!(?cmd, "control update");
                apply_command(cmd, tuning, mapper);
            }
            None => debug!("dropped control datagram: {text:?}"),
        }
    }
}
