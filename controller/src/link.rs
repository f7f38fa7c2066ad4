use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use feeder_common::{FeederSettings, TARE_COMMAND, TARE_LINE};

/// The single load-cell connection. `None` until a sensor dials in; a
/// newer accept replaces the old handle wholesale. The controller never
/// dials out -- reconnecting is the sensor node's job.
#[derive(Debug)]
pub struct SensorLink {
    conn: Option<TcpStream>,
    tare_burst_count: u32,
    tare_burst_spacing: Duration,
}

impl SensorLink {
    pub fn new(settings: &FeederSettings) -> Self {
        Self {
            conn: None,
            tare_burst_count: settings.tare_burst_count,
            tare_burst_spacing: Duration::from_millis(settings.tare_burst_spacing_ms),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Non-blocking accept. On a new connection the remote sensor is
    /// zeroed with a short burst of tare commands; the burst sleeps are
    /// bounded and happen only on the accept edge.
    pub fn try_accept(&mut self, listener: &TcpListener) {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!("load cell connected from {peer}");
                if let Err(err) = stream.set_nonblocking(true) {
                    warn!("failed to set sensor stream non-blocking: {err}");
                }
                self.conn = Some(stream);
                for n in 0..self.tare_burst_count {
                    self.best_effort_send(TARE_COMMAND);
                    if n + 1 < self.tare_burst_count {
                        thread::sleep(self.tare_burst_spacing);
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {}
            Err(err) => debug!("sensor accept failed: {err}"),
        }
    }

    /// One non-blocking read per tick. Returns the last complete reading
    /// in the payload, if any; malformed lines are skipped so a garbled
    /// sample never takes the loop down. EOF or a real transport error
    /// drops the connection back to `None` for the next accept.
    pub fn poll_weight(&mut self) -> Option<f32> {
        let conn = self.conn.as_mut()?;
        let mut buf = [0u8; 64];
        match conn.read(&mut buf) {
            Ok(0) => {
                info!("load cell disconnected");
                self.conn = None;
                None
            }
            Ok(n) => parse_weight_lines(&String::from_utf8_lossy(&buf[..n])),
            Err(err) if err.kind() == ErrorKind::WouldBlock => None,
            Err(err) => {
                warn!("load cell read failed: {err}; dropping connection");
                self.conn = None;
                None
            }
        }
    }

    /// User-requested re-tare; silently a no-op without a sensor.
    pub fn send_tare_line(&mut self) {
        self.best_effort_send(TARE_LINE);
    }

    /// Sensor commands are advisory: a failed send is logged and dropped.
    /// Transport failure is only acted on at the read step.
    fn best_effort_send(&mut self, payload: &[u8]) {
        let Some(conn) = self.conn.as_mut() else {
            debug!("no sensor connected; dropping {} byte command", payload.len());
            return;
        };
        if let Err(err) = conn.write_all(payload) {
            debug!("sensor command send failed: {err}");
        }
    }
}

/// Splits a payload into newline-delimited readings and keeps the last
/// one that parses. A line split across two reads may be dropped; the
/// sensor pushes several samples a second, so the next one wins anyway.
fn parse_weight_lines(payload: &str) -> Option<f32> {
    let mut latest = None;
    for line in payload.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<f32>() {
            Ok(value) => latest = Some(value),
            Err(_) => debug!("skipping malformed weight line {line:?}"),
        }
    }
    latest
}
