use std::io::{ErrorKind, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use feeder_common::{should_trigger, FeedTime, FeederSettings};

use crate::clock;
use crate::gate::{GateActuator, GateDrive};
use crate::http;
use crate::link::SensorLink;
use crate::state::ControllerState;
use crate::store::ConfigStore;

/// The controller core: one thread, one non-blocking poll cycle per tick.
/// Nothing in the cycle blocks indefinitely; the absence of a pending
/// connection or reading is not an error, and no error here is fatal.
pub struct EventLoop<D> {
    settings: FeederSettings,
    state: ControllerState,
    gate: GateActuator<D>,
    link: SensorLink,
    store: ConfigStore,
    http_listener: TcpListener,
    sensor_listener: TcpListener,
}

impl<D: GateDrive> EventLoop<D> {
    pub fn bind(
        settings: FeederSettings,
        state: ControllerState,
        gate: GateActuator<D>,
        store: ConfigStore,
    ) -> anyhow::Result<Self> {
        let http_listener = TcpListener::bind(("0.0.0.0", settings.http_port))
            .with_context(|| format!("failed to bind http listener on {}", settings.http_port))?;
        http_listener
            .set_nonblocking(true)
            .context("failed to set http listener non-blocking")?;
        info!("http listening on port {}", settings.http_port);

        let sensor_listener = TcpListener::bind(("0.0.0.0", settings.sensor_port))
            .with_context(|| {
                format!("failed to bind sensor listener on {}", settings.sensor_port)
            })?;
        sensor_listener
            .set_nonblocking(true)
            .context("failed to set sensor listener non-blocking")?;
        info!("load cell listening on port {}", settings.sensor_port);

        let link = SensorLink::new(&settings);
        Ok(Self {
            settings,
            state,
            gate,
            link,
            store,
            http_listener,
            sensor_listener,
        })
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        let tick_interval = Duration::from_millis(self.settings.tick_interval_ms);
        loop {
            self.tick();
            thread::sleep(tick_interval);
        }
    }

    /// One poll cycle, in fixed order: sensor accept, HTTP dispatch,
    /// sensor read, then the autonomous checks. HTTP-triggered mutations
    /// land before the checks, so a manual override is visible to the
    /// weight and schedule logic within the same tick.
    fn tick(&mut self) {
        if !self.link.is_connected() {
            self.link.try_accept(&self.sensor_listener);
        }

        let now = clock::local_now(self.settings.utc_offset_secs);
        self.poll_http(&now);

        if let Some(weight) = self.link.poll_weight() {
            debug!("weight reading {weight:.2} g");
            self.state.weight_g = weight;
        }

        autonomous_checks(
            &mut self.state,
            &mut self.gate,
            self.settings.weight_threshold_g,
            clock::minute_stamp(&now),
            clock::day_of_month(&now),
        );
    }

    /// At most one client per tick: accept, read one bounded request,
    /// respond, close. The short read timeout keeps a stalled client from
    /// wedging the loop.
    fn poll_http(&mut self, now: &DateTime<FixedOffset>) {
        let (mut stream, peer) = match self.http_listener.accept() {
            Ok(pair) => pair,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return,
            Err(err) => {
                debug!("http accept failed: {err}");
                return;
            }
        };
        debug!("http request from {peer}");

        let _ = stream.set_nonblocking(false);
        if let Err(err) = stream.set_read_timeout(Some(Duration::from_millis(500))) {
            debug!("failed to set http read timeout: {err}");
        }

        let mut buf = [0u8; 1024];
        let raw = match stream.read(&mut buf) {
            Ok(n) => String::from_utf8_lossy(&buf[..n]).into_owned(),
            Err(err) => {
                debug!("http read failed: {err}");
                return;
            }
        };

        let response = http::handle_request(
            &raw,
            &mut self.state,
            &mut self.gate,
            &mut self.link,
            &self.store,
            now,
        );
        if let Err(err) = stream.write_all(response.as_bytes()) {
            debug!("http write failed: {err}");
        }
    }
}

/// Steps 4 and 5 of the cycle: close the gate once enough food has landed
/// on the scale, then open it if a feed time has come due today.
fn autonomous_checks<D: GateDrive>(
    state: &mut ControllerState,
    gate: &mut GateActuator<D>,
    threshold_g: f32,
    stamp: FeedTime,
    day: u32,
) {
    if gate.is_open() && state.weight_g >= threshold_g {
        info!(
            "weight {:.2} g reached threshold {threshold_g} g; closing gate",
            state.weight_g
        );
        gate.close();
        gate.play_close_animation();
    }

    if should_trigger(&state.schedule, &state.ledger, stamp, day) {
        info!("feed time {stamp} reached; opening gate");
        gate.open();
        state.ledger.record(stamp, day);
        gate.play_open_animation();
    }
}
